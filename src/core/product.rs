//! Product business logic - the shop's catalog.
//!
//! This module provides functions for creating, retrieving, updating, and deleting
//! products and their variants. Products are persisted through `SeaORM`; variants
//! live in their own table and are always loaded together with their product as a
//! [`CatalogProduct`]. All functions are async and return `Result` types.

use crate::{
    config::ProductSeed,
    entities::{Product, ProductVariant, product, product_variant},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

/// Category filter value that matches every product
pub const ALL_CATEGORIES: &str = "all";

/// A product together with its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogProduct {
    pub product: product::Model,
    pub variants: Vec<product_variant::Model>,
}

impl CatalogProduct {
    /// Price shown in the catalog: the cheapest variant when variants exist,
    /// otherwise the product's own price.
    #[must_use]
    pub fn display_price(&self) -> i64 {
        self.variants
            .iter()
            .map(|v| v.price)
            .min()
            .unwrap_or(self.product.price)
    }

    /// Looks up a variant by exact name.
    #[must_use]
    pub fn find_variant(&self, name: &str) -> Option<&product_variant::Model> {
        self.variants.iter().find(|v| v.name == name)
    }

    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.product.stock > 0
    }
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub price: i64,
    pub weight: String,
    pub image: String,
    pub category: String,
    pub stock: i64,
}

impl From<&ProductSeed> for ProductInput {
    fn from(seed: &ProductSeed) -> Self {
        Self {
            name: seed.name.clone(),
            price: seed.price,
            weight: seed.weight.clone(),
            image: seed.image.clone(),
            category: seed.category.clone(),
            stock: seed.stock,
        }
    }
}

fn validate_input(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if input.category.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product category cannot be empty".to_string(),
        });
    }
    if input.price < 0 {
        return Err(Error::InvalidAmount {
            amount: input.price,
        });
    }
    if input.stock < 0 {
        return Err(Error::InvalidAmount {
            amount: input.stock,
        });
    }
    Ok(())
}

// `find_with_related` orders rows by primary key to group them, so name order is
// applied after loading.
fn pair_up(rows: Vec<(product::Model, Vec<product_variant::Model>)>) -> Vec<CatalogProduct> {
    let mut products: Vec<CatalogProduct> = rows
        .into_iter()
        .map(|(product, mut variants)| {
            variants.sort_by_key(|v| v.id);
            CatalogProduct { product, variants }
        })
        .collect();
    products.sort_by(|a, b| a.product.name.cmp(&b.product.name));
    products
}

/// Retrieves every product with its variants, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<CatalogProduct>> {
    let rows = Product::find()
        .find_with_related(ProductVariant)
        .all(db)
        .await?;
    Ok(pair_up(rows))
}

/// Retrieves products in `category`, or every product for [`ALL_CATEGORIES`].
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_products_by_category(
    db: &DatabaseConnection,
    category: &str,
) -> Result<Vec<CatalogProduct>> {
    if category == ALL_CATEGORIES {
        return get_all_products(db).await;
    }

    let rows = Product::find()
        .filter(product::Column::Category.eq(category))
        .find_with_related(ProductVariant)
        .all(db)
        .await?;
    Ok(pair_up(rows))
}

/// Lists the distinct categories present in the catalog, sorted.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_categories(db: &DatabaseConnection) -> Result<Vec<String>> {
    Product::find()
        .select_only()
        .column(product::Column::Category)
        .distinct()
        .order_by_asc(product::Column::Category)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a product by exact name, ignoring surrounding whitespace.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product together with its variants.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_catalog_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<CatalogProduct>> {
    let Some(product) = get_product_by_id(db, product_id).await? else {
        return Ok(None);
    };
    let variants = product
        .find_related(ProductVariant)
        .order_by_asc(product_variant::Column::Id)
        .all(db)
        .await?;
    Ok(Some(CatalogProduct { product, variants }))
}

/// Retrieves a product with its variants by exact name.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if no product has this name, or an error
/// if the database query fails.
pub async fn get_catalog_product_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<CatalogProduct> {
    let product = get_product_by_name(db, name)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: name.to_string(),
        })?;
    get_catalog_product(db, product.id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: name.to_string(),
        })
}

/// Product names identify products in every command, so they must be unique.
async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    except_id: Option<i64>,
) -> Result<()> {
    if let Some(existing) = get_product_by_name(db, name).await?
        && Some(existing.id) != except_id
    {
        return Err(Error::Validation {
            message: format!("A product named '{}' already exists", existing.name),
        });
    }
    Ok(())
}

/// Creates a new product after validating the input.
///
/// # Errors
/// Returns an error if:
/// - The name or category is empty or whitespace-only
/// - Another product already has this name
/// - The price or stock is negative
/// - The database insert operation fails
pub async fn create_product(db: &DatabaseConnection, input: ProductInput) -> Result<product::Model> {
    validate_input(&input)?;
    ensure_name_available(db, &input.name, None).await?;

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        price: Set(input.price),
        weight: Set(input.weight.trim().to_string()),
        image: Set(input.image),
        category: Set(input.category.trim().to_string()),
        stock: Set(input.stock),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = product.insert(db).await?;
    info!("Created product {} '{}'", created.id, created.name);
    Ok(created)
}

/// Replaces every editable field of an existing product.
///
/// # Errors
/// Returns an error if validation fails, the new name belongs to another
/// product, the product does not exist, or the update fails.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    input: ProductInput,
) -> Result<product::Model> {
    validate_input(&input)?;
    ensure_name_available(db, &input.name, Some(product_id)).await?;

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?
        .into();

    product.name = Set(input.name.trim().to_string());
    product.price = Set(input.price);
    product.weight = Set(input.weight.trim().to_string());
    product.image = Set(input.image);
    product.category = Set(input.category.trim().to_string());
    product.stock = Set(input.stock);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Sets the stock count of a product.
///
/// # Errors
/// Returns an error if the stock is negative, the product does not exist, or
/// the update fails.
pub async fn set_stock(
    db: &DatabaseConnection,
    product_id: i64,
    stock: i64,
) -> Result<product::Model> {
    if stock < 0 {
        return Err(Error::InvalidAmount { amount: stock });
    }

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?
        .into();

    product.stock = Set(stock);
    product.updated_at = Set(chrono::Utc::now().naive_utc());
    product.update(db).await.map_err(Into::into)
}

/// Deletes a product and all of its variants.
///
/// Past orders keep their own snapshot of the product and are not affected.
///
/// # Errors
/// Returns an error if the product does not exist or the delete fails.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let txn = db.begin().await?;

    let product = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?;

    ProductVariant::delete_many()
        .filter(product_variant::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    Product::delete_by_id(product_id).exec(&txn).await?;

    txn.commit().await?;
    info!("Deleted product {} '{}'", product.id, product.name);
    Ok(product)
}

/// Adds a variant to a product.
///
/// # Errors
/// Returns an error if:
/// - The name or weight is empty, or the price is not positive
/// - The product does not exist
/// - The product already has a variant with that name
pub async fn add_variant(
    db: &DatabaseConnection,
    product_id: i64,
    name: String,
    price: i64,
    weight: String,
) -> Result<product_variant::Model> {
    let name = name.trim().to_string();
    let weight = weight.trim().to_string();
    if name.is_empty() || weight.is_empty() {
        return Err(Error::Validation {
            message: "Variant name and weight are required".to_string(),
        });
    }
    if price <= 0 {
        return Err(Error::InvalidAmount { amount: price });
    }

    let catalog_product =
        get_catalog_product(db, product_id)
            .await?
            .ok_or_else(|| Error::ProductNotFound {
                name: product_id.to_string(),
            })?;

    if catalog_product.find_variant(&name).is_some() {
        return Err(Error::Validation {
            message: format!(
                "Product '{}' already has a variant named '{name}'",
                catalog_product.product.name
            ),
        });
    }

    let variant = product_variant::ActiveModel {
        product_id: Set(product_id),
        name: Set(name),
        price: Set(price),
        weight: Set(weight),
        ..Default::default()
    };
    variant.insert(db).await.map_err(Into::into)
}

/// Removes a product's variant by name.
///
/// # Errors
/// Returns an error if no such variant exists or the delete fails.
pub async fn remove_variant(db: &DatabaseConnection, product_id: i64, name: &str) -> Result<()> {
    let result = ProductVariant::delete_many()
        .filter(product_variant::Column::ProductId.eq(product_id))
        .filter(product_variant::Column::Name.eq(name.trim()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::VariantNotFound {
            product_id,
            variant: name.to_string(),
        });
    }
    Ok(())
}

/// Seeds the catalog from configuration when the products table is empty.
///
/// Returns the number of products created; zero when the catalog already had
/// products.
///
/// # Errors
/// Returns an error if a seed entry is invalid or a database operation fails.
pub async fn seed_catalog(db: &DatabaseConnection, seeds: &[ProductSeed]) -> Result<usize> {
    let existing = Product::find().count(db).await?;
    if existing > 0 {
        info!("Catalog already has {existing} products, skipping seed");
        return Ok(0);
    }

    for seed in seeds {
        let created = create_product(db, ProductInput::from(seed)).await?;
        for variant in &seed.variants {
            add_variant(
                db,
                created.id,
                variant.name.clone(),
                variant.price,
                variant.weight.clone(),
            )
            .await?;
        }
    }

    info!("Seeded catalog with {} products", seeds.len());
    Ok(seeds.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::VariantSeed;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = product_input("Сыр", 450);
        input.name = "   ".to_string();
        let result = create_product(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_product(&db, product_input("Сыр", -1)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -1 })));

        let mut input = product_input("Сыр", 450);
        input.stock = -5;
        let result = create_product(&db, input).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -5 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_product(&db, product_input("  Сыр сливочный ", 450)).await?;
        assert_eq!(product.name, "Сыр сливочный");
        assert_eq!(product.price, 450);
        assert_eq!(product.weight, "300г");

        let found = get_product_by_name(&db, "Сыр сливочный").await?;
        assert_eq!(found.map(|p| p.id), Some(product.id));

        let padded = get_product_by_name(&db, " Сыр сливочный  ").await?;
        assert_eq!(padded.map(|p| p.id), Some(product.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_display_price_uses_cheapest_variant() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Сыр с травами", 500).await?;

        let plain = get_catalog_product(&db, product.id).await?.unwrap();
        assert_eq!(plain.display_price(), 500);

        add_variant(&db, product.id, "с укропом".into(), 520, "300г".into()).await?;
        add_variant(&db, product.id, "мини".into(), 260, "150г".into()).await?;

        let with_variants = get_catalog_product(&db, product.id).await?.unwrap();
        assert_eq!(with_variants.variants.len(), 2);
        assert_eq!(with_variants.display_price(), 260);
        assert_eq!(with_variants.find_variant("мини").map(|v| v.price), Some(260));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_variant_rejects_duplicates_and_bad_input() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Сыр", 450).await?;

        add_variant(&db, product.id, "мини".into(), 200, "150г".into()).await?;
        let dup = add_variant(&db, product.id, "мини".into(), 210, "150г".into()).await;
        assert!(matches!(dup, Err(Error::Validation { .. })));

        let free = add_variant(&db, product.id, "даром".into(), 0, "150г".into()).await;
        assert!(matches!(free, Err(Error::InvalidAmount { amount: 0 })));

        let unnamed = add_variant(&db, product.id, " ".into(), 100, "150г".into()).await;
        assert!(matches!(unnamed, Err(Error::Validation { .. })));

        let missing = add_variant(&db, 999, "мини".into(), 100, "150г".into()).await;
        assert!(matches!(missing, Err(Error::ProductNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_variant() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Сыр", 450).await?;
        add_variant(&db, product.id, "мини".into(), 200, "150г".into()).await?;

        remove_variant(&db, product.id, "мини").await?;
        let result = remove_variant(&db, product.id, "мини").await;
        assert!(matches!(result, Err(Error::VariantNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_product_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Сыр", 450).await?;
        add_variant(&db, product.id, "мини".into(), 200, "150г".into()).await?;

        let found = get_catalog_product_by_name(&db, " Сыр ").await?;
        assert_eq!(found.product.id, product.id);
        assert_eq!(found.variants.len(), 1);

        let missing = get_catalog_product_by_name(&db, "Брынза").await;
        assert!(matches!(missing, Err(Error::ProductNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Творог", 280).await?;

        let mut input = product_input("Творог деревенский", 300);
        input.weight = "500г".to_string();
        input.category = "dairy".to_string();
        let updated = update_product(&db, product.id, input).await?;
        assert_eq!(updated.name, "Творог деревенский");
        assert_eq!(updated.price, 300);
        assert_eq!(updated.category, "dairy");

        let stocked = set_stock(&db, product.id, 25).await?;
        assert_eq!(stocked.stock, 25);
        assert!(matches!(
            set_stock(&db, product.id, -1).await,
            Err(Error::InvalidAmount { amount: -1 })
        ));
        assert!(matches!(
            set_stock(&db, 999, 1).await,
            Err(Error::ProductNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_product_names_stay_unique() -> Result<()> {
        let db = setup_test_db().await?;
        let cheese = create_test_product(&db, "Сыр", 450).await?;
        let curd = create_test_product(&db, "Творог", 280).await?;

        assert!(matches!(
            create_product(&db, product_input(" Сыр ", 500)).await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            update_product(&db, curd.id, product_input("Сыр", 280)).await,
            Err(Error::Validation { .. })
        ));

        // Keeping its own name is not a conflict
        let repriced = update_product(&db, cheese.id, product_input("Сыр", 480)).await?;
        assert_eq!(repriced.price, 480);

        let found = get_catalog_product_by_name(&db, "Творог").await?;
        assert_eq!(found.product.id, curd.id);
        assert_eq!(get_all_products(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_removes_variants() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Сыр", 450).await?;
        add_variant(&db, product.id, "мини".into(), 200, "150г".into()).await?;

        delete_product(&db, product.id).await?;
        assert!(get_product_by_id(&db, product.id).await?.is_none());
        assert_eq!(ProductVariant::find().count(&db).await?, 0);

        let again = delete_product(&db, product.id).await;
        assert!(matches!(again, Err(Error::ProductNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_category_filter_and_listing() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_product(&db, "Сыр Пармезан", 650, "cheese").await?;
        create_custom_product(&db, "Молоко", 120, "dairy").await?;
        create_custom_product(&db, "Бри", 700, "cheese").await?;

        let cheese = get_products_by_category(&db, "cheese").await?;
        let names: Vec<_> = cheese.iter().map(|p| p.product.name.as_str()).collect();
        assert_eq!(names, vec!["Бри", "Сыр Пармезан"]);

        let all = get_products_by_category(&db, ALL_CATEGORIES).await?;
        assert_eq!(all.len(), 3);

        assert_eq!(get_categories(&db).await?, vec!["cheese", "dairy"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_only_when_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = vec![ProductSeed {
            name: "Сыр сливочный".to_string(),
            price: 450,
            weight: "300г".to_string(),
            image: String::new(),
            category: "cheese".to_string(),
            stock: 15,
            variants: vec![VariantSeed {
                name: "мини".to_string(),
                price: 230,
                weight: "150г".to_string(),
            }],
        }];

        assert_eq!(seed_catalog(&db, &seeds).await?, 1);
        assert_eq!(seed_catalog(&db, &seeds).await?, 0);

        let all = get_all_products(&db).await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].variants.len(), 1);
        assert_eq!(all[0].display_price(), 230);
        Ok(())
    }
}
