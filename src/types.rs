use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

/// One input row as handed over by whatever read the extract: column header
/// to raw cell text.
pub type RawRecord = HashMap<String, String>;

/// Column headers of the material study extract.
pub mod columns {
    pub const SEC_ORDER: &str = "SEC order";
    pub const SEC_NUMBER: &str = "SEC Number";
    pub const PRODUCT: &str = "product";
    pub const ITEM: &str = "item";
    pub const DESCRIPTION: &str = "description";
    pub const REQ_QTY: &str = "req_qty";
    pub const ALLOCATED_QTY: &str = "allocated_qty";
    pub const BALANCE: &str = "balance";
    pub const SUPPLY_TYPE: &str = "supply_type";
    pub const SOURCE: &str = "source";
    pub const LOCATER: &str = "locater";
    pub const SUPPLIER: &str = "supplier";
    pub const DELAY: &str = "delay";
    pub const AVAILABILITY_DATE: &str = "availability_date";
    pub const ROH_DELIVERY: &str = "ROH delivery";
    pub const SEC_DELIVERY: &str = "SEC delivery";
    pub const ASN_EXPECTED_DATE: &str = "Asn Expected Date";
    pub const ASN_CREATION_DATE: &str = "Asn Creation Date";

    pub const ALL: [&str; 18] = [
        SEC_ORDER,
        SEC_NUMBER,
        PRODUCT,
        ITEM,
        DESCRIPTION,
        REQ_QTY,
        ALLOCATED_QTY,
        BALANCE,
        SUPPLY_TYPE,
        SOURCE,
        LOCATER,
        SUPPLIER,
        DELAY,
        AVAILABILITY_DATE,
        ROH_DELIVERY,
        SEC_DELIVERY,
        ASN_EXPECTED_DATE,
        ASN_CREATION_DATE,
    ];
}

/// Where the allocated quantity of a line comes from.
///
/// The extract uses short planner codes (`inventory`, `PO`, `QC`, ...). The set
/// is open: anything unrecognised is kept verbatim in `Other` and reported
/// under the `other` label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupplyType {
    OnHand,
    Purchased,
    Requisition,
    QualityControl,
    GoodsReceipt,
    Transfer,
    Manufactured,
    Other(String),
}

impl SupplyType {
    pub fn parse(raw: &str) -> Self {
        let code = raw.trim();
        match code.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "inventory" | "on_hand" | "onhand" | "stock" => SupplyType::OnHand,
            "po" | "purchased" | "purchase" | "purchase_order" => SupplyType::Purchased,
            "pr" | "requisition" | "purchase_requisition" => SupplyType::Requisition,
            "qc" | "quality" | "inspection" => SupplyType::QualityControl,
            "gr_in_process" | "gr" | "goods_receipt" => SupplyType::GoodsReceipt,
            "transfer" | "to" | "transfer_order" => SupplyType::Transfer,
            "manufactured" | "wip" | "job" | "make" => SupplyType::Manufactured,
            _ => SupplyType::Other(code.to_string()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SupplyType::OnHand => "inventory",
            SupplyType::Purchased => "PO",
            SupplyType::Requisition => "PR",
            SupplyType::QualityControl => "QC",
            SupplyType::GoodsReceipt => "GR_in_process",
            SupplyType::Transfer => "transfer",
            SupplyType::Manufactured => "manufactured",
            SupplyType::Other(_) => "other",
        }
    }
}

impl fmt::Display for SupplyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SupplyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Canonical, validated form of one extract row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialLineItem {
    /// 1-based position of the row in the input sequence.
    pub row: usize,
    pub sec_order: String,
    pub sec_number: String,
    pub product: String,
    pub item: String,
    pub description: String,
    pub req_qty: f64,
    pub allocated_qty: f64,
    pub balance: f64,
    pub supply_type: SupplyType,
    pub source: String,
    pub locater: String,
    pub supplier: String,
    /// Days behind plan; positive means late.
    pub delay: f64,
    /// False when the delay cell was blank or unreadable and `delay` is a default.
    pub delay_reported: bool,
    pub availability_date: Option<NaiveDate>,
    pub roh_delivery: Option<NaiveDate>,
    pub sec_delivery: Option<NaiveDate>,
    pub asn_expected_date: Option<NaiveDate>,
    pub asn_creation_date: Option<NaiveDate>,
}

impl MaterialLineItem {
    pub fn project_key(&self) -> ProjectKey {
        ProjectKey {
            sec_order: self.sec_order.clone(),
            product: self.product.clone(),
        }
    }

    /// Best known resolution date: the planned availability, else the ASN date.
    pub fn eta(&self) -> Option<NaiveDate> {
        self.availability_date.or(self.asn_expected_date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    ShortNoEta,
    Delayed,
    AtRisk,
    ShortWithEta,
    InTransit,
    Available,
}

impl ItemStatus {
    /// Every status, most severe first.
    pub const ALL: [ItemStatus; 6] = [
        ItemStatus::ShortNoEta,
        ItemStatus::Delayed,
        ItemStatus::AtRisk,
        ItemStatus::ShortWithEta,
        ItemStatus::InTransit,
        ItemStatus::Available,
    ];

    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            ItemStatus::Delayed | ItemStatus::ShortNoEta | ItemStatus::AtRisk
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::ShortNoEta => "SHORT_NO_ETA",
            ItemStatus::Delayed => "DELAYED",
            ItemStatus::AtRisk => "AT_RISK",
            ItemStatus::ShortWithEta => "SHORT_WITH_ETA",
            ItemStatus::InTransit => "IN_TRANSIT",
            ItemStatus::Available => "AVAILABLE",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Readiness {
    Ready,
    Blocked,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Ready => f.write_str("READY"),
            Readiness::Blocked => f.write_str("BLOCKED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProjectKey {
    pub sec_order: String,
    pub product: String,
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.sec_order, self.product)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ItemStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyQuantity {
    pub supply_type: String,
    pub items: usize,
    pub allocated_qty: f64,
}

/// A production project: every line item sharing one `ProjectKey`.
///
/// Line items are referenced by their index into the analysed item slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub key: ProjectKey,
    /// Distinct SEC numbers seen on the project's lines, sorted.
    pub sec_numbers: Vec<String>,
    pub items: Vec<usize>,
    pub readiness: Readiness,
    /// Blocking lines, largest open balance first.
    pub blocking_items: Vec<usize>,
    pub total_req: f64,
    pub total_allocated: f64,
    pub total_balance: f64,
    pub fulfillment_pct: f64,
    pub max_delay: f64,
    pub sec_delivery: Option<NaiveDate>,
    pub roh_delivery: Option<NaiveDate>,
    pub status_counts: Vec<StatusCount>,
    pub supply_breakdown: Vec<SupplyQuantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierProfile {
    pub rank: usize,
    pub supplier: String,
    pub item_count: usize,
    pub delayed_count: usize,
    pub mean_delay: f64,
    pub max_delay: f64,
    pub delayed_allocated_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockedProjectSummary {
    pub sec_order: String,
    pub product: String,
    pub blocking_count: usize,
    pub blocking_balance: f64,
    pub max_delay: f64,
    pub sec_delivery: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_items: usize,
    pub total_projects: usize,
    pub ready_projects: usize,
    pub blocked_projects: usize,
    pub total_suppliers: usize,
    pub overall_fulfillment_pct: f64,
    pub status_counts: Vec<StatusCount>,
    pub supply_types: Vec<SupplyQuantity>,
    pub top_blocked_projects: Vec<BlockedProjectSummary>,
    pub top_suppliers: Vec<SupplierProfile>,
    pub warning_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectReadinessRow {
    #[serde(rename = "SECOrder")]
    #[tabled(rename = "SECOrder")]
    pub sec_order: String,
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Readiness")]
    #[tabled(rename = "Readiness")]
    pub readiness: String,
    #[serde(rename = "Items")]
    #[tabled(rename = "Items")]
    pub items: usize,
    #[serde(rename = "Blocking")]
    #[tabled(rename = "Blocking")]
    pub blocking: usize,
    #[serde(rename = "FulfillmentPct")]
    #[tabled(rename = "FulfillmentPct")]
    pub fulfillment_pct: String,
    #[serde(rename = "MaxDelay")]
    #[tabled(rename = "MaxDelay")]
    pub max_delay: String,
    #[serde(rename = "SECDelivery")]
    #[tabled(rename = "SECDelivery")]
    pub sec_delivery: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BlockingItemRow {
    #[serde(rename = "SECOrder")]
    #[tabled(rename = "SECOrder")]
    pub sec_order: String,
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Item")]
    #[tabled(rename = "Item")]
    pub item: String,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Balance")]
    #[tabled(rename = "Balance")]
    pub balance: String,
    #[serde(rename = "Delay")]
    #[tabled(rename = "Delay")]
    pub delay: String,
    #[serde(rename = "Supplier")]
    #[tabled(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "ETA")]
    #[tabled(rename = "ETA")]
    pub eta: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SupplierRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Supplier")]
    #[tabled(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Items")]
    #[tabled(rename = "Items")]
    pub items: usize,
    #[serde(rename = "DelayedItems")]
    #[tabled(rename = "DelayedItems")]
    pub delayed_items: usize,
    #[serde(rename = "AvgDelay")]
    #[tabled(rename = "AvgDelay")]
    pub avg_delay: String,
    #[serde(rename = "MaxDelay")]
    #[tabled(rename = "MaxDelay")]
    pub max_delay: String,
    #[serde(rename = "QtyDelayed")]
    #[tabled(rename = "QtyDelayed")]
    pub qty_delayed: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StatusCountRow {
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Items")]
    #[tabled(rename = "Items")]
    pub items: usize,
    #[serde(rename = "Blocking")]
    #[tabled(rename = "Blocking")]
    pub blocking: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ActionItemRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "SECOrder")]
    #[tabled(rename = "SECOrder")]
    pub sec_order: String,
    #[serde(rename = "Item")]
    #[tabled(rename = "Item")]
    pub item: String,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "Qty")]
    #[tabled(rename = "Qty")]
    pub qty: String,
    #[serde(rename = "Source")]
    #[tabled(rename = "Source")]
    pub source: String,
    #[serde(rename = "Locater")]
    #[tabled(rename = "Locater")]
    pub locater: String,
    #[serde(rename = "Supplier")]
    #[tabled(rename = "Supplier")]
    pub supplier: String,
}
