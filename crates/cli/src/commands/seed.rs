//! Seed command.
//!
//! Ensures at least one super admin exists, then optionally loads demo
//! products and blog posts from a YAML file. Content is only loaded into
//! empty tables, so running the command twice is harmless.
//!
//! ```yaml
//! products:
//!   - name: Walnut Cutting Board
//!     description: End-grain, finished with food-safe oil.
//!     price: "49.90"
//!     category: Kitchen
//!     isFeatured: true
//! blogs:
//!   - title: Caring for wooden boards
//!     content: Oil monthly, never soak...
//!     status: published
//! ```

use serde::Deserialize;
use sqlx::PgPool;

use orchard_api::db::{BlogRepository, PrincipalRepository, ProductRepository};
use orchard_core::Price;
use orchard_core::models::{AffiliateLink, NewBlog, NewProduct};

use super::admin::{insert, new_principal};
use super::{CliError, admin_password, connect};

const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_NAME: &str = "Super Admin";

/// A product entry in a fixture file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedProduct {
    name: String,
    description: String,
    price: Price,
    category: String,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    affiliate_links: Vec<AffiliateLink>,
}

impl From<SeedProduct> for NewProduct {
    fn from(p: SeedProduct) -> Self {
        Self {
            name: p.name,
            description: p.description,
            price: p.price,
            category: p.category,
            is_featured: p.is_featured,
            affiliate_links: p.affiliate_links,
        }
    }
}

/// Demo content loaded by `orchard seed --file`.
#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    products: Vec<SeedProduct>,
    #[serde(default)]
    blogs: Vec<NewBlog>,
}

/// Parsed, validated fixture content.
struct Fixture {
    products: Vec<NewProduct>,
    blogs: Vec<NewBlog>,
}

fn parse_fixture(yaml: &str) -> Result<Fixture, CliError> {
    let file: SeedFile = serde_yaml::from_str(yaml)?;

    let products: Vec<NewProduct> = file.products.into_iter().map(Into::into).collect();
    for product in &products {
        product.validate()?;
    }
    for blog in &file.blogs {
        blog.validate()?;
    }

    Ok(Fixture {
        products,
        blogs: file.blogs,
    })
}

/// Run the seed command.
///
/// # Errors
///
/// Returns `CliError` if the fixture is unreadable or invalid, or a database
/// operation fails.
pub async fn run(file: Option<&str>) -> Result<(), CliError> {
    // Validate the fixture before touching the database.
    let fixture = match file {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::Io {
                    path: path.to_owned(),
                    source,
                })?;
            let fixture = parse_fixture(&yaml)?;
            tracing::info!(
                products = fixture.products.len(),
                blogs = fixture.blogs.len(),
                "Fixture validated"
            );
            Some(fixture)
        }
        None => None,
    };

    let pool = connect().await?;

    ensure_super_admin(&pool).await?;

    if let Some(fixture) = fixture {
        seed_content(&pool, fixture).await?;
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

async fn ensure_super_admin(pool: &PgPool) -> Result<(), CliError> {
    let principals = PrincipalRepository::new(pool).list_all().await?;
    if principals.iter().any(|p| p.role.is_super_admin()) {
        tracing::info!("Super admin already exists, skipping");
        return Ok(());
    }

    let email = std::env::var("ORCHARD_ADMIN_EMAIL").unwrap_or_else(|_| {
        tracing::warn!("ORCHARD_ADMIN_EMAIL not set, using {DEFAULT_ADMIN_EMAIL}");
        DEFAULT_ADMIN_EMAIL.to_owned()
    });

    let new = new_principal(&email, DEFAULT_ADMIN_NAME, "super-admin", admin_password()?)?;
    let principal = insert(pool, &new).await?;

    tracing::info!("Super admin created: {} (ID {})", principal.email, principal.id);
    Ok(())
}

async fn seed_content(pool: &PgPool, fixture: Fixture) -> Result<(), CliError> {
    let products = ProductRepository::new(pool);
    if products.list_all().await?.is_empty() {
        for product in &fixture.products {
            let created = products.create(product, None).await?;
            tracing::info!("  Product #{}: {}", created.id, created.name);
        }
    } else {
        tracing::info!("Products already present, skipping");
    }

    let blogs = BlogRepository::new(pool);
    if blogs.list_all().await?.is_empty() {
        for blog in &fixture.blogs {
            let created = blogs.create(blog).await?;
            tracing::info!("  Blog #{}: {}", created.id, created.title);
        }
    } else {
        tracing::info!("Blogs already present, skipping");
    }

    Ok(())
}
