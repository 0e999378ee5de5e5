//! Catalog
//!
//! The set of purchasable products, their category-derived tax rates, and
//! loading from YAML catalog files.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::money::{Money, MoneyError};

/// Catalog construction and parsing errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A product price could not be parsed into minor units.
    #[error("invalid price for product {id}: {source}")]
    InvalidPrice {
        /// Product id carrying the bad price.
        id: String,
        /// Underlying parse failure.
        source: MoneyError,
    },

    /// A product price was negative.
    #[error("negative price for product {0}")]
    NegativePrice(String),

    /// Two products share the same id.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(String),
}

/// A purchasable product.
///
/// Products are constructed once at catalog load and never mutated. The tax
/// rate is resolved from the product's category at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: String,
    name: String,
    unit_price: Money,
    category: String,
    tax_rate: Decimal,
}

impl Product {
    /// Creates a product, deriving its tax rate from the given schedule.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        category: impl Into<String>,
        schedule: &TaxSchedule,
    ) -> Self {
        let category = category.into();
        let tax_rate = schedule.rate_for(&category);

        Product {
            id: id.into(),
            name: name.into(),
            unit_price,
            category,
            tax_rate,
        }
    }

    /// Unique product id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Product category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Tax rate as a percentage, e.g. `18` for 18% GST.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

/// Category to tax-rate mapping, with a default rate for unknown categories.
///
/// Category names are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct TaxSchedule {
    rates: FxHashMap<String, Decimal>,
    default_rate: Decimal,
}

impl TaxSchedule {
    /// Creates an empty schedule with the given default rate.
    pub fn new(default_rate: Decimal) -> Self {
        TaxSchedule {
            rates: FxHashMap::default(),
            default_rate,
        }
    }

    /// Adds or replaces the rate for a category.
    #[must_use]
    pub fn with_rate(mut self, category: &str, rate: Decimal) -> Self {
        self.rates.insert(category.to_lowercase(), rate);
        self
    }

    /// Returns the rate for a category, falling back to the default rate.
    pub fn rate_for(&self, category: &str) -> Decimal {
        self.rates
            .get(&category.to_lowercase())
            .copied()
            .unwrap_or(self.default_rate)
    }
}

impl Default for TaxSchedule {
    /// Standard GST schedule: Electronics 18%, Books 5%, everything else 5%.
    fn default() -> Self {
        TaxSchedule::new(Decimal::from(5))
            .with_rate("Electronics", Decimal::from(18))
            .with_rate("Books", Decimal::from(5))
    }
}

/// One product entry in a YAML catalog file.
#[derive(Debug, Deserialize)]
struct ProductEntry {
    id: String,
    name: String,
    /// Price in major units as a decimal string, e.g. `"1200.00"`.
    price: String,
    category: String,
}

/// Top-level YAML catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<ProductEntry>,
}

/// The known set of purchasable products, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: FxHashMap<String, Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Loads a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Io`]: the file could not be read.
    /// - [`CatalogError::Yaml`]: the file is not valid catalog YAML.
    /// - [`CatalogError::InvalidPrice`]: a price string could not be parsed.
    /// - [`CatalogError::NegativePrice`]: a price was below zero.
    /// - [`CatalogError::DuplicateProduct`]: two entries share an id.
    pub fn from_yaml_file(path: &Path, schedule: &TaxSchedule) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let file: CatalogFile = serde_norway::from_str(&raw)?;

        let mut catalog = Catalog::new();

        for entry in file.products {
            let price = Money::parse(&entry.price).map_err(|source| CatalogError::InvalidPrice {
                id: entry.id.clone(),
                source,
            })?;

            catalog.insert(Product::new(
                entry.id, entry.name, price, entry.category, schedule,
            ))?;
        }

        Ok(catalog)
    }

    /// The mock catalog used by the console storefront when no file is given.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the built-in entries fail validation, which
    /// only happens if they are edited into an inconsistent state.
    pub fn sample() -> Result<Self, CatalogError> {
        let schedule = TaxSchedule::default();
        let mut catalog = Catalog::new();

        catalog.insert(Product::new(
            "P101",
            "Laptop",
            Money::from_major(1200),
            "Electronics",
            &schedule,
        ))?;
        catalog.insert(Product::new(
            "P102",
            "Java Book",
            Money::from_major(45),
            "Books",
            &schedule,
        ))?;
        catalog.insert(Product::new(
            "P103",
            "Headphones",
            Money::from_major(150),
            "Electronics",
            &schedule,
        ))?;
        catalog.insert(Product::new(
            "P104",
            "Desk Lamp",
            Money::from_major(30),
            "Home",
            &schedule,
        ))?;

        Ok(catalog)
    }

    /// Adds a product to the catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NegativePrice`]: the product price is negative.
    /// - [`CatalogError::DuplicateProduct`]: a product with the same id exists.
    pub fn insert(&mut self, product: Product) -> Result<(), CatalogError> {
        if product.unit_price().is_negative() {
            return Err(CatalogError::NegativePrice(product.id().to_owned()));
        }

        if self.products.contains_key(product.id()) {
            return Err(CatalogError::DuplicateProduct(product.id().to_owned()));
        }

        self.products.insert(product.id().to_owned(), product);

        Ok(())
    }

    /// Looks up a product by id.
    pub fn lookup(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Returns all products sorted ascending by unit price.
    pub fn list_all(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by_key(|product| product.unit_price());
        products
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn schedule_rate_lookup_is_case_insensitive() {
        let schedule = TaxSchedule::default();

        assert_eq!(schedule.rate_for("Electronics"), Decimal::from(18));
        assert_eq!(schedule.rate_for("ELECTRONICS"), Decimal::from(18));
        assert_eq!(schedule.rate_for("electronics"), Decimal::from(18));
    }

    #[test]
    fn schedule_falls_back_to_default_rate() {
        let schedule = TaxSchedule::default();

        assert_eq!(schedule.rate_for("Home"), Decimal::from(5));
        assert_eq!(schedule.rate_for("Garden"), Decimal::from(5));
    }

    #[test]
    fn product_derives_rate_from_category() {
        let schedule = TaxSchedule::default();
        let laptop = Product::new("P101", "Laptop", Money::from_major(1200), "Electronics", &schedule);

        assert_eq!(laptop.tax_rate(), Decimal::from(18));
    }

    #[test]
    fn sample_catalog_lookup() -> TestResult {
        let catalog = Catalog::sample()?;

        match catalog.lookup("P101") {
            Some(laptop) => {
                assert_eq!(laptop.name(), "Laptop");
                assert_eq!(laptop.unit_price(), Money::from_major(1200));
            }
            None => panic!("P101 missing from sample catalog"),
        }

        assert!(catalog.lookup("P999").is_none());

        Ok(())
    }

    #[test]
    fn list_all_sorts_ascending_by_price() -> TestResult {
        let catalog = Catalog::sample()?;

        let ids: Vec<&str> = catalog.list_all().iter().map(|p| p.id()).collect();

        assert_eq!(ids, ["P104", "P102", "P103", "P101"]);

        Ok(())
    }

    #[test]
    fn insert_rejects_duplicate_ids() -> TestResult {
        let schedule = TaxSchedule::default();
        let mut catalog = Catalog::new();

        catalog.insert(Product::new(
            "P1",
            "Pen",
            Money::from_major(2),
            "Stationery",
            &schedule,
        ))?;

        let duplicate = Product::new("P1", "Pencil", Money::from_major(1), "Stationery", &schedule);

        assert!(matches!(
            catalog.insert(duplicate),
            Err(CatalogError::DuplicateProduct(id)) if id == "P1"
        ));

        Ok(())
    }

    #[test]
    fn insert_rejects_negative_prices() {
        let schedule = TaxSchedule::default();
        let mut catalog = Catalog::new();

        let bad = Product::new("P1", "Refund", Money::from_minor(-100), "Misc", &schedule);

        assert!(matches!(
            catalog.insert(bad),
            Err(CatalogError::NegativePrice(_))
        ));
    }

    #[test]
    fn from_yaml_file_parses_products() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            "products:\n  - id: P201\n    name: Keyboard\n    price: \"75.50\"\n    category: Electronics\n  - id: P202\n    name: Notebook\n    price: \"3.25\"\n    category: Stationery"
        )?;

        let catalog = Catalog::from_yaml_file(file.path(), &TaxSchedule::default())?;

        assert_eq!(catalog.len(), 2);

        match catalog.lookup("P201") {
            Some(keyboard) => {
                assert_eq!(keyboard.unit_price(), Money::from_minor(7550));
                assert_eq!(keyboard.tax_rate(), Decimal::from(18));
            }
            None => panic!("P201 missing from loaded catalog"),
        }

        Ok(())
    }

    #[test]
    fn from_yaml_file_rejects_bad_price() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            "products:\n  - id: P301\n    name: Mystery\n    price: \"lots\"\n    category: Misc"
        )?;

        let result = Catalog::from_yaml_file(file.path(), &TaxSchedule::default());

        assert!(matches!(
            result,
            Err(CatalogError::InvalidPrice { id, .. }) if id == "P301"
        ));

        Ok(())
    }
}
