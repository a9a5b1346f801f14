//! # Domain Types
//!
//! Core domain records shared by the session layer, the REST client and the
//! screens.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  UserProfile    │   │    Business     │   │     Branch      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  role           │──►│  plan           │──►│  name           │       │
//! │  │  is_active      │   │  location       │   │  location       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  StoreProduct   │   │  SoldProduct    │   │ RestoredProduct │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity       │──►│  credit fields  │   │  restore note   │       │
//! │  │  cost / price   │   │  payment status │   │  cost / price   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Backend records are camelCase JSON with Mongo-style `_id` keys. Every id
//! field accepts both `_id` and `id`. Profile records read from the identity
//! backend are snake_case and live in `tally-session`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::ledger::{compute_totals, CreditSale, SaleTotals};
use crate::money::Money;
use crate::CoreResult;

// =============================================================================
// Role
// =============================================================================

/// The two recognized roles. Anything else fails profile validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match only. Profile records carry the role as stored, and a
/// differently cased or padded value is not a recognized role.
impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("unrecognized role '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Business & Branch
// =============================================================================

/// Subscription plan of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BusinessPlan {
    #[default]
    Free,
    Basic,
    Pro,
}

/// A business (tenant) that owns branches and employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub plan: BusinessPlan,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub cell: String,
    #[serde(default)]
    pub village: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A physical branch of a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "branchName", alias = "name")]
    pub name: String,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Branch {
    /// The implicit branch used when a profile has none assigned.
    ///
    /// ```rust
    /// use tally_core::types::{Branch, Business, BusinessPlan};
    ///
    /// let business = Business {
    ///     id: "b1".into(),
    ///     name: "Kigali Hardware".into(),
    ///     plan: BusinessPlan::Basic,
    ///     photo: None,
    ///     district: "Gasabo".into(),
    ///     sector: "Remera".into(),
    ///     cell: "Rukiri".into(),
    ///     village: "Amahoro".into(),
    ///     is_active: true,
    /// };
    /// assert_eq!(Branch::main_for(&business).name, "Kigali Hardware - Main Branch");
    /// ```
    pub fn main_for(business: &Business) -> Self {
        Branch {
            id: business.id.clone(),
            name: format!("{} - Main Branch", business.name),
            district: business.district.clone(),
            sector: business.sector.clone(),
            cell: business.cell.clone(),
            village: business.village.clone(),
            created_at: None,
        }
    }
}

/// A branch reference embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BranchRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub branch_name: Option<String>,
}

/// Branch create/update form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BranchForm {
    pub branch_name: String,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
}

// =============================================================================
// User Profile
// =============================================================================

/// The validated profile of the signed-in user.
///
/// Only ever constructed after every required field was checked, so nothing
/// here is optional that the rest of the dashboard relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: Role,
    pub business_id: Option<String>,
    pub business: Option<Business>,
    pub branch: Option<Branch>,
    pub is_active: bool,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Joins first and last name the way every header shows it.
    pub fn compose_full_name(first: &str, last: &str) -> String {
        format!("{} {}", first.trim(), last.trim()).trim().to_string()
    }

    /// Applies a local patch. The backend record is not touched.
    ///
    /// Blank names are ignored; a signed-in profile always keeps both.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(first) = patch.first_name.filter(|n| !n.trim().is_empty()) {
            self.first_name = first.trim().to_string();
        }
        if let Some(last) = patch.last_name.filter(|n| !n.trim().is_empty()) {
            self.last_name = last.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(gender) = patch.gender {
            self.gender = Some(gender);
        }
        if let Some(image) = patch.profile_image {
            self.profile_image = Some(image);
        }
        if let Some(branch) = patch.branch {
            self.branch = Some(branch);
        }
        self.full_name = Self::compose_full_name(&self.first_name, &self.last_name);
        self.updated_at = Some(Utc::now());
    }
}

/// Fields of the signed-in profile that may be changed locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub branch: Option<Branch>,
}

// =============================================================================
// Employee
// =============================================================================

/// An employee record as managed by admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub cell: String,
    #[serde(default)]
    pub village: String,
    pub role: Role,
    #[serde(default)]
    pub branch: Option<BranchRef>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, alias = "imagephoto")]
    pub profile_image: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        UserProfile::compose_full_name(&self.first_name, &self.last_name)
    }

    pub fn branch_name(&self) -> Option<&str> {
        self.branch.as_ref().and_then(|b| b.branch_name.as_deref())
    }
}

/// Employee create/update form.
///
/// `branch: None` serializes as `null`, which the backend reads as
/// "unassigned".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Editable fields of the signed-in user's own backend profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub profile_image: Option<String>,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
}

// =============================================================================
// Product Enums
// =============================================================================

/// Lifecycle status of a product record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProductStatus {
    #[default]
    #[serde(alias = "store")]
    Store,
    #[serde(alias = "sold")]
    Sold,
    #[serde(alias = "restored")]
    Restored,
    #[serde(alias = "returned")]
    Returned,
    #[serde(alias = "deleted")]
    Deleted,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProductStatus::Store => "Store",
            ProductStatus::Sold => "Sold",
            ProductStatus::Restored => "Restored",
            ProductStatus::Returned => "Returned",
            ProductStatus::Deleted => "Deleted",
        };
        f.write_str(s)
    }
}

/// Derived payment state of a credit sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Unpaid => "Unpaid",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    Cash,
    #[serde(rename = "Mobile Money")]
    MobileMoney,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Credit,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::MobileMoney => "Mobile Money",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Credit => "Credit",
        };
        f.write_str(s)
    }
}

/// Unit a stock quantity is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    #[default]
    Pcs,
    Kg,
    Liter,
    Pack,
    Dozen,
    Meter,
    Box,
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuantityUnit::Pcs => "pcs",
            QuantityUnit::Kg => "kg",
            QuantityUnit::Liter => "liter",
            QuantityUnit::Pack => "pack",
            QuantityUnit::Dozen => "dozen",
            QuantityUnit::Meter => "meter",
            QuantityUnit::Box => "box",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity {
    pub value: i64,
    #[serde(default)]
    pub unit: QuantityUnit,
}

impl Quantity {
    pub const fn new(value: i64, unit: QuantityUnit) -> Self {
        Quantity { value, unit }
    }
}

// =============================================================================
// Store Product
// =============================================================================

/// A product held in stock at a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreProduct {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_name: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    pub quantity: Quantity,
    pub branch: String,
    #[serde(default)]
    pub status: ProductStatus,
    pub cost_price: Money,
    #[serde(default)]
    pub selling_price: Option<Money>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
}

impl StoreProduct {
    /// Units currently available to sell.
    pub fn available(&self) -> i64 {
        self.quantity.value
    }
}

/// Store product create/update form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreProductForm {
    pub product_name: String,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub condition: Option<String>,
    pub quantity: Quantity,
    pub branch: String,
    pub cost_price: Money,
    pub selling_price: Option<Money>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub supplier: Option<String>,
    pub barcode: Option<String>,
}

// =============================================================================
// Sold Product
// =============================================================================

/// A product sold on (possibly partial) credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SoldProduct {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_name: String,
    pub category: String,
    pub quantity: Quantity,
    pub branch: String,
    pub cost_price: Money,
    #[serde(default)]
    pub selling_price: Option<Money>,
    pub total_amount_to_pay: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, alias = "customerPhone")]
    pub customer_contact: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[ts(as = "String")]
    pub sold_date: DateTime<Utc>,
}

impl SoldProduct {
    /// Rebuilds the ledger view of this row, checking its invariant.
    pub fn credit(&self) -> CoreResult<CreditSale> {
        CreditSale::from_parts(self.total_amount_to_pay, self.amount_paid)
    }

    pub fn totals(&self) -> CoreResult<SaleTotals> {
        compute_totals(self.cost_price, self.selling_price, self.quantity.value)
    }
}

// =============================================================================
// Restored Product
// =============================================================================

/// A product returned into stock, sellable again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RestoredProduct {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_name: String,
    pub category: String,
    #[serde(default)]
    pub model: Option<String>,
    pub quantity: i64,
    pub branch: Branch,
    #[serde(default = "restored_status")]
    pub status: ProductStatus,
    pub cost_price: Money,
    #[serde(default)]
    pub selling_price: Option<Money>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub restore_comment: Option<String>,
}

fn restored_status() -> ProductStatus {
    ProductStatus::Restored
}

impl RestoredProduct {
    /// `quantity × selling price`, unavailable when no price is set or the
    /// product does not fit.
    pub fn total_amount(&self) -> Option<Money> {
        self.selling_price
            .and_then(|p| p.checked_multiply_quantity(self.quantity))
    }
}

// =============================================================================
// Trash
// =============================================================================

/// Where a trashed product came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TrashOrigin {
    Sold,
    Store,
}

/// A soft-deleted product awaiting restore or permanent deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TrashedProduct {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_name: String,
    pub category: String,
    pub quantity: Quantity,
    pub cost_price: Money,
    #[serde(default)]
    pub selling_price: Option<Money>,
    pub original_type: TrashOrigin,
    pub branch: String,
    #[ts(as = "String")]
    pub deleted_date: DateTime<Utc>,
}

// =============================================================================
// Dashboard Stats
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NamedUnits {
    pub name: String,
    pub units: i64,
}

/// Headline figures shown on the dashboard landing screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_employees: i64,
    pub total_branches: i64,
    pub stock_value: Money,
    pub sold_products: i64,
    pub expiry_products: i64,
    pub deleted_products: i64,
    pub total_profit: Money,
    pub total_revenue: Money,
    pub outstanding_payments: Money,
    pub loss: Money,
    pub most_stocked_product: NamedUnits,
    pub least_stocked_product: NamedUnits,
    pub most_sold_product: NamedUnits,
    pub products_added_this_week: i64,
    pub active_suppliers: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
