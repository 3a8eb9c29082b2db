//! Product master

use chrono::{DateTime, Utc};
use erp_common::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::master::{normalize_code, normalize_name, optional_text, Master};
use crate::error::{MasterError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    #[default]
    Active,
    Discontinued,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Unit of measure, e.g. `pcs` or `kg`
    pub unit: String,
    pub unit_price: Decimal,
    /// Percentage, 0 to 100
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub reorder_level: Option<u32>,
    #[serde(default)]
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unit price including tax, rounded to cents
    pub fn price_with_tax(&self) -> Decimal {
        let tax = self.unit_price * self.tax_rate / Decimal::ONE_HUNDRED;
        (self.unit_price + tax).round_dp(2)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub reorder_level: Option<u32>,
}

impl ProductDraft {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, unit: impl Into<String>, unit_price: Decimal) -> Self {
        Self { sku: sku.into(), name: name.into(), unit: unit.into(), unit_price, ..Self::default() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub status: Option<ProductStatus>,
}

fn validate_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() {
        return Err(MasterError::invalid("unitPrice", "must not be negative"));
    }
    Ok(price)
}

fn validate_tax(rate: Decimal) -> Result<Decimal> {
    if rate.is_sign_negative() || rate > Decimal::ONE_HUNDRED {
        return Err(MasterError::invalid("taxRate", "must be between 0 and 100"));
    }
    Ok(rate)
}

fn validate_unit(unit: &str) -> Result<String> {
    let unit = unit.trim().to_lowercase();
    if unit.is_empty() || unit.len() > 10 {
        return Err(MasterError::invalid("unit", "must be 1-10 characters"));
    }
    Ok(unit)
}

impl Master for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;
    type Status = ProductStatus;

    const KIND: &'static str = "product";

    fn create(draft: ProductDraft) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: EntityId::new(),
            sku: normalize_code("sku", &draft.sku)?,
            name: normalize_name("name", &draft.name)?,
            description: optional_text(draft.description),
            category: optional_text(draft.category),
            unit: validate_unit(&draft.unit)?,
            unit_price: validate_price(draft.unit_price)?,
            tax_rate: validate_tax(draft.tax_rate)?,
            reorder_level: draft.reorder_level,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, patch: ProductPatch) -> Result<()> {
        let name = patch.name.as_deref().map(|n| normalize_name("name", n)).transpose()?;
        let unit_price = patch.unit_price.map(validate_price).transpose()?;
        let tax_rate = patch.tax_rate.map(validate_tax).transpose()?;
        if self.status == ProductStatus::Discontinued && patch.status == Some(ProductStatus::Draft) {
            return Err(MasterError::invalid("status", "a discontinued product cannot return to draft"));
        }

        if let Some(name) = name {
            self.name = name;
        }
        if patch.description.is_some() {
            self.description = optional_text(patch.description);
        }
        if let Some(price) = unit_price {
            self.unit_price = price;
        }
        if let Some(rate) = tax_rate {
            self.tax_rate = rate;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn code(&self) -> &str {
        &self.sku
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> ProductStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_and_price_with_tax() {
        let mut draft = ProductDraft::new("bolt-m8", "Hex bolt M8", "PCS", dec!(0.40));
        draft.tax_rate = dec!(18);
        let p = Product::create(draft).unwrap();
        assert_eq!(p.sku, "BOLT-M8");
        assert_eq!(p.unit, "pcs");
        assert_eq!(p.price_with_tax(), dec!(0.47));
    }

    #[test]
    fn test_create_rejects_out_of_range_figures() {
        let negative = ProductDraft::new("P1", "Widget", "pcs", dec!(-1));
        assert!(matches!(
            Product::create(negative),
            Err(MasterError::Invalid { field: "unitPrice", .. })
        ));

        let mut taxed = ProductDraft::new("P1", "Widget", "pcs", dec!(1));
        taxed.tax_rate = dec!(101);
        assert!(matches!(
            Product::create(taxed),
            Err(MasterError::Invalid { field: "taxRate", .. })
        ));

        assert!(Product::create(ProductDraft::new("P1", "Widget", " ", dec!(1))).is_err());
    }

    #[test]
    fn test_discontinued_cannot_return_to_draft() {
        let mut p = Product::create(ProductDraft::new("P1", "Widget", "pcs", dec!(1))).unwrap();
        p.apply(ProductPatch { status: Some(ProductStatus::Discontinued), ..ProductPatch::default() })
            .unwrap();
        assert!(p
            .apply(ProductPatch { status: Some(ProductStatus::Draft), ..ProductPatch::default() })
            .is_err());
        assert_eq!(p.status(), ProductStatus::Discontinued);
    }
}
