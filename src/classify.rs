//! Per-line readiness classification.
use crate::types::{ItemStatus, MaterialLineItem};
use chrono::NaiveDate;

/// Assign exactly one status to a line item. First matching rule wins:
///
/// 1. nothing open (`balance <= 0`): `Available`
/// 2. open and reported late (`delay > 0`): `Delayed`
/// 3. open, ASN due on or before the SEC delivery target: `InTransit`
/// 4. open, no availability date and no ASN date: `ShortNoEta`
/// 5. open, best ETA after the SEC delivery target: `AtRisk`
/// 6. otherwise: `ShortWithEta`
///
/// A line without an SEC delivery target has nothing to be late against, so
/// any known date counts as timely.
pub fn classify(item: &MaterialLineItem) -> ItemStatus {
    if item.balance <= 0.0 {
        return ItemStatus::Available;
    }
    if item.delay > 0.0 {
        return ItemStatus::Delayed;
    }
    let timely = |date: NaiveDate| item.sec_delivery.map_or(true, |target| date <= target);
    if item.asn_expected_date.is_some_and(timely) {
        return ItemStatus::InTransit;
    }
    match item.eta() {
        None => ItemStatus::ShortNoEta,
        Some(eta) if timely(eta) => ItemStatus::ShortWithEta,
        Some(_) => ItemStatus::AtRisk,
    }
}

/// Statuses for a slice of items, index-aligned with the input.
pub fn classify_all(items: &[MaterialLineItem]) -> Vec<ItemStatus> {
    items.iter().map(classify).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::SupplyType;

    pub(crate) fn line(item: &str, balance: f64, delay: f64) -> MaterialLineItem {
        MaterialLineItem {
            row: 1,
            sec_order: "SO-1".to_string(),
            sec_number: "SEC-1".to_string(),
            product: "PUMP".to_string(),
            item: item.to_string(),
            description: String::new(),
            req_qty: balance.max(0.0),
            allocated_qty: 0.0,
            balance,
            supply_type: SupplyType::Purchased,
            source: String::new(),
            locater: String::new(),
            supplier: String::new(),
            delay,
            delay_reported: true,
            availability_date: None,
            roh_delivery: None,
            sec_delivery: None,
            asn_expected_date: None,
            asn_creation_date: None,
        }
    }

    pub(crate) fn date(m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, m, d)
    }

    #[test]
    fn fully_allocated_is_available() {
        let mut it = line("A", 0.0, 0.0);
        it.req_qty = 100.0;
        it.allocated_qty = 100.0;
        assert_eq!(classify(&it), ItemStatus::Available);
    }

    #[test]
    fn available_ignores_every_other_field() {
        let mut it = line("A", 0.0, 30.0);
        it.availability_date = date(9, 1);
        it.sec_delivery = date(6, 1);
        assert_eq!(classify(&it), ItemStatus::Available);
        it.balance = -4.0;
        assert_eq!(classify(&it), ItemStatus::Available);
    }

    #[test]
    fn positive_delay_is_delayed() {
        let mut it = line("A", 20.0, 5.0);
        it.asn_expected_date = date(5, 1);
        it.sec_delivery = date(6, 1);
        assert_eq!(classify(&it), ItemStatus::Delayed);
    }

    #[test]
    fn timely_asn_is_in_transit() {
        let mut it = line("A", 10.0, 0.0);
        it.asn_expected_date = date(6, 1);
        it.sec_delivery = date(6, 1);
        assert_eq!(classify(&it), ItemStatus::InTransit);
    }

    #[test]
    fn no_dates_is_short_no_eta() {
        let mut it = line("A", 10.0, 0.0);
        it.sec_delivery = date(6, 1);
        assert_eq!(classify(&it), ItemStatus::ShortNoEta);
        it.delay = -3.0;
        assert_eq!(classify(&it), ItemStatus::ShortNoEta);
    }

    #[test]
    fn late_availability_is_at_risk() {
        let mut it = line("A", 10.0, 0.0);
        it.availability_date = date(7, 1);
        it.sec_delivery = date(6, 1);
        assert_eq!(classify(&it), ItemStatus::AtRisk);
    }

    #[test]
    fn late_asn_without_availability_is_at_risk() {
        let mut it = line("A", 10.0, 0.0);
        it.asn_expected_date = date(7, 1);
        it.sec_delivery = date(6, 1);
        assert_eq!(classify(&it), ItemStatus::AtRisk);
    }

    #[test]
    fn timely_availability_is_short_with_eta() {
        let mut it = line("A", 10.0, 0.0);
        it.availability_date = date(5, 20);
        it.sec_delivery = date(6, 1);
        assert_eq!(classify(&it), ItemStatus::ShortWithEta);
    }

    #[test]
    fn missing_target_treats_dates_as_timely() {
        let mut it = line("A", 10.0, 0.0);
        it.availability_date = date(12, 31);
        assert_eq!(classify(&it), ItemStatus::ShortWithEta);
        it.asn_expected_date = date(12, 31);
        assert_eq!(classify(&it), ItemStatus::InTransit);
    }
}
