//! # Checkout Fixture
//!
//! The scripted run is described by a TOML fixture: which mode to
//! exercise, the shipping form contents, and (for DIRECT mode) the
//! ad-hoc item.

use anyhow::Context;
use checkout_core::{CheckoutItem, Currency, Price, ShippingAddress};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureMode {
    Cart,
    Direct,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutFixture {
    pub mode: FixtureMode,
    #[serde(default)]
    pub currency: Currency,
    /// Flat shipping charge in major units, for the display estimate
    #[serde(default)]
    pub flat_shipping: f64,
    /// Tax rate in basis points (8% = 800), for the display estimate
    #[serde(default)]
    pub tax_rate_bps: u32,
    pub shipping: ShippingFixture,
    /// Required when `mode = "direct"`
    #[serde(default)]
    pub direct_item: Option<ItemFixture>,
}

#[derive(Debug, Deserialize)]
pub struct ShippingFixture {
    pub name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    pub sku_code: String,
    pub product_name: String,
    /// Major units, converted once at load
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CheckoutFixture {
    /// Load from an explicit path, or fall back to config/checkout.toml
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {path}"))?;
            let fixture: CheckoutFixture =
                toml::from_str(&content).with_context(|| format!("failed to parse {path}"))?;
            tracing::info!("loaded checkout fixture from {path}");
            return Ok(fixture);
        }

        let paths = [
            "config/checkout.toml",
            "../config/checkout.toml",
            "../../config/checkout.toml",
        ];

        for path in paths {
            if let Ok(content) = std::fs::read_to_string(path) {
                let fixture: CheckoutFixture = toml::from_str(&content)
                    .with_context(|| format!("failed to parse {path}"))?;
                tracing::info!("loaded checkout fixture from {path}");
                return Ok(fixture);
            }
        }
        anyhow::bail!("no checkout fixture found (looked for config/checkout.toml)")
    }

    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            name: self.shipping.name.clone(),
            email: self.shipping.email.clone(),
            street: self.shipping.street.clone(),
            city: self.shipping.city.clone(),
            state: self.shipping.state.clone(),
            postal_code: self.shipping.postal_code.clone(),
            phone: self.shipping.phone.clone(),
        }
    }

    pub fn direct_item(&self) -> anyhow::Result<CheckoutItem> {
        let fixture = self
            .direct_item
            .as_ref()
            .context("mode = \"direct\" requires a [direct_item] table")?;
        let mut item = CheckoutItem::new(
            &fixture.sku_code,
            &fixture.product_name,
            Price::from_major(fixture.unit_price, self.currency),
            fixture.quantity,
        );
        if let Some(url) = &fixture.image_url {
            item = item.with_image(url);
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_fixture() {
        let fixture: CheckoutFixture = toml::from_str(
            r#"
            mode = "direct"
            currency = "USD"

            [shipping]
            name = "Asha Rao"
            email = "asha@example.com"
            street = "14 MG Road"
            city = "Bengaluru"
            state = "KA"
            postal_code = "560001"
            phone = "+91 98450 00000"

            [direct_item]
            sku_code = "SKU-1"
            product_name = "Widget"
            unit_price = 12.5
            quantity = 2
            "#,
        )
        .unwrap();

        assert_eq!(fixture.mode, FixtureMode::Direct);
        let item = fixture.direct_item().unwrap();
        assert_eq!(item.unit_price.amount_minor, 1250);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_cart_fixture_needs_no_item() {
        let fixture: CheckoutFixture = toml::from_str(
            r#"
            mode = "cart"

            [shipping]
            name = "Asha Rao"
            email = "asha@example.com"
            street = "14 MG Road"
            city = "Bengaluru"
            state = "KA"
            postal_code = "560001"
            phone = "+91 98450 00000"
            "#,
        )
        .unwrap();

        assert_eq!(fixture.mode, FixtureMode::Cart);
        assert_eq!(fixture.currency, Currency::INR);
        assert!(fixture.direct_item().is_err());
    }
}
