//! Products, reviews and the client-side product snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, check_text};
use crate::state::Identified;
use crate::types::{Price, ProductId, ReviewId};

/// A link to the same product in another shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateLink {
    pub shop: String,
    pub url: String,
    pub price: Price,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default = "Utc::now")]
    pub last_checked: DateTime<Utc>,
}

const fn default_in_stock() -> bool {
    true
}

impl AffiliateLink {
    /// Check that the shop name and URL are present.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `affiliateLinks` on failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.shop.trim().is_empty() {
            return Err(ValidationError::new(
                "affiliateLinks",
                "every link needs a shop",
            ));
        }
        let url = self.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::new(
                "affiliateLinks",
                format!("invalid url for {}", self.shop),
            ));
        }
        Ok(())
    }
}

/// Parse the JSON-encoded `affiliateLinks` form field.
///
/// # Errors
///
/// Returns a `ValidationError` if the input is not a JSON array of links or
/// any link fails [`AffiliateLink::validate`].
pub fn parse_affiliate_links(raw: &str) -> Result<Vec<AffiliateLink>, ValidationError> {
    let links: Vec<AffiliateLink> = serde_json::from_str(raw)
        .map_err(|e| ValidationError::new("affiliateLinks", format!("malformed JSON: {e}")))?;
    for link in &links {
        link.validate()?;
    }
    Ok(links)
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    /// Public path of the product image, e.g. `/uploads/1700000000000-42.png`.
    pub image: Option<String>,
    pub is_featured: bool,
    pub affiliate_links: Vec<AffiliateLink>,
    /// Mean review rating, 0 when there are no reviews.
    pub rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// A product together with its reviews, as returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<Review>,
}

/// The fields of a product submitted by an admin.
///
/// The image travels separately as a file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub is_featured: bool,
    pub affiliate_links: Vec<AffiliateLink>,
}

impl NewProduct {
    /// # Errors
    ///
    /// Returns a `ValidationError` for blank text fields or invalid links.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, Some(200))?;
        check_text("description", &self.description, None)?;
        check_text("category", &self.category, Some(100))?;
        self.affiliate_links
            .iter()
            .try_for_each(AffiliateLink::validate)
    }
}

/// A partial product update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub is_featured: Option<bool>,
    pub affiliate_links: Option<Vec<AffiliateLink>>,
}

impl ProductPatch {
    /// # Errors
    ///
    /// Returns a `ValidationError` for blank text fields or invalid links.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_text("name", name, Some(200))?;
        }
        if let Some(description) = &self.description {
            check_text("description", description, None)?;
        }
        if let Some(category) = &self.category {
            check_text("category", category, Some(100))?;
        }
        if let Some(links) = &self.affiliate_links {
            links.iter().try_for_each(AffiliateLink::validate)?;
        }
        Ok(())
    }

    /// Whether the patch changes anything besides the image.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.is_featured.is_none()
            && self.affiliate_links.is_none()
    }
}

/// A product review.
///
/// The reviewer's client address is stored server-side but never part of the
/// wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/products/{id}/reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    /// Lowest accepted rating.
    pub const MIN_RATING: u8 = 1;
    /// Highest accepted rating.
    pub const MAX_RATING: u8 = 5;

    /// # Errors
    ///
    /// Returns a `ValidationError` for a blank name or comment, or a rating
    /// outside 1-5.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("userName", &self.user_name, Some(100))?;
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::new(
                "rating",
                format!(
                    "must be between {} and {}",
                    Self::MIN_RATING,
                    Self::MAX_RATING
                ),
            ));
        }
        check_text("comment", &self.comment, Some(2000))
    }
}

/// Review ordering for the paginated review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
    MostLiked,
}

impl ReviewSort {
    /// The query-string name of this ordering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Highest => "highest",
            Self::Lowest => "lowest",
            Self::MostLiked => "mostLiked",
        }
    }
}

/// Query string of `GET /api/products/{id}/reviews`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQuery {
    #[serde(default)]
    pub sort: Option<ReviewSort>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A validated review page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewPageRequest {
    pub sort: ReviewSort,
    pub page: i64,
    pub limit: i64,
}

impl ReviewPageRequest {
    pub const DEFAULT_LIMIT: i64 = 3;
    pub const MAX_LIMIT: i64 = 50;
    /// Highest page number accepted; keeps the offset well inside `i64`.
    pub const MAX_PAGE: i64 = 1_000_000;

    /// Number of reviews to skip.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl TryFrom<ReviewQuery> for ReviewPageRequest {
    type Error = ValidationError;

    fn try_from(query: ReviewQuery) -> Result<Self, Self::Error> {
        let page = query.page.unwrap_or(1);
        if !(1..=Self::MAX_PAGE).contains(&page) {
            return Err(ValidationError::new(
                "page",
                format!("must be between 1 and {}", Self::MAX_PAGE),
            ));
        }
        let limit = query.limit.unwrap_or(Self::DEFAULT_LIMIT);
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::new(
                "limit",
                format!("must be between 1 and {}", Self::MAX_LIMIT),
            ));
        }
        Ok(Self {
            sort: query.sort.unwrap_or_default(),
            page,
            limit,
        })
    }
}

/// One page of reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub total: i64,
    pub has_more: bool,
}

impl ReviewPage {
    /// Build a page from the reviews fetched at `offset` out of `total`.
    #[must_use]
    pub fn new(reviews: Vec<Review>, total: i64, offset: i64) -> Self {
        let fetched = i64::try_from(reviews.len()).unwrap_or(i64::MAX);
        Self {
            has_more: total > offset.saturating_add(fetched),
            reviews,
            total,
        }
    }
}

/// Response of `GET /api/products/{id}/reviews/check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCheck {
    pub has_reviewed: bool,
}

/// Response of `POST /api/reviews/{id}/like`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLikeResult {
    #[serde(flatten)]
    pub review: Review,
    pub has_liked: bool,
}

/// The subset of a product kept in the favorites and cart collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: String,
    pub image: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            image: product.image.clone(),
        }
    }
}

impl Identified for ProductSnapshot {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(id: i32, rating: u8) -> Review {
        Review {
            id: ReviewId::new(id),
            product_id: ProductId::new(1),
            user_name: "Sam".to_owned(),
            rating,
            comment: "Lovely".to_owned(),
            likes: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_affiliate_links() {
        let links = parse_affiliate_links(
            r#"[{"shop":"Amazon","url":"https://amazon.example/p/1","price":"12.50"}]"#,
        )
        .unwrap();
        assert_eq!(links.len(), 1);
        assert!(links[0].in_stock);
        assert_eq!(links[0].price.to_string(), "12.50");

        assert!(parse_affiliate_links("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_affiliate_links_rejects_bad_input() {
        let err = parse_affiliate_links("{not json").unwrap_err();
        assert_eq!(err.field, "affiliateLinks");

        let err = parse_affiliate_links(r#"[{"shop":"Amazon","url":"ftp://x","price":1}]"#)
            .unwrap_err();
        assert_eq!(err.field, "affiliateLinks");

        assert!(parse_affiliate_links(r#"[{"shop":"","url":"https://x","price":1}]"#).is_err());
    }

    #[test]
    fn test_new_review_rating_bounds() {
        let mut body = NewReview {
            user_name: "Kim".to_owned(),
            rating: 5,
            comment: "Great".to_owned(),
        };
        assert!(body.validate().is_ok());

        body.rating = 0;
        assert_eq!(body.validate().unwrap_err().field, "rating");
        body.rating = 6;
        assert_eq!(body.validate().unwrap_err().field, "rating");
    }

    #[test]
    fn test_review_page_request_defaults() {
        let request = ReviewPageRequest::try_from(ReviewQuery::default()).unwrap();
        assert_eq!(request.sort, ReviewSort::Newest);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 3);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_review_page_request_bounds() {
        let query = |page, limit| ReviewQuery {
            sort: Some(ReviewSort::MostLiked),
            page: Some(page),
            limit: Some(limit),
        };
        assert_eq!(
            ReviewPageRequest::try_from(query(3, 10)).unwrap().offset(),
            20
        );
        assert!(ReviewPageRequest::try_from(query(0, 10)).is_err());
        assert!(ReviewPageRequest::try_from(query(1, 0)).is_err());
        assert!(ReviewPageRequest::try_from(query(1, 51)).is_err());

        let last = ReviewPageRequest::try_from(query(ReviewPageRequest::MAX_PAGE, 50)).unwrap();
        assert_eq!(last.offset(), (ReviewPageRequest::MAX_PAGE - 1) * 50);
        let err = ReviewPageRequest::try_from(query(i64::MAX, 50)).unwrap_err();
        assert_eq!(err.field, "page");
    }

    #[test]
    fn test_review_sort_wire_names() {
        let sort: ReviewSort = serde_json::from_str("\"mostLiked\"").unwrap();
        assert_eq!(sort, ReviewSort::MostLiked);
        assert_eq!(
            serde_json::to_value(sort).unwrap(),
            serde_json::json!(sort.as_str())
        );
    }

    #[test]
    fn test_review_page_has_more() {
        let page = ReviewPage::new(vec![review(1, 5), review(2, 4)], 5, 0);
        assert!(page.has_more);

        let page = ReviewPage::new(vec![review(5, 3)], 5, 4);
        assert!(!page.has_more);
    }

    #[test]
    fn test_product_detail_flattens_product() {
        let product = Product {
            id: ProductId::new(9),
            name: "Mug".to_owned(),
            description: "Ceramic".to_owned(),
            price: Price::parse("8").unwrap(),
            category: "kitchen".to_owned(),
            image: None,
            is_featured: true,
            affiliate_links: Vec::new(),
            rating: 4.5,
            num_reviews: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(ProductDetail {
            product,
            reviews: vec![review(1, 5)],
        })
        .unwrap();

        assert_eq!(json["id"], 9);
        assert_eq!(json["isFeatured"], true);
        assert_eq!(json["numReviews"], 2);
        assert_eq!(json["reviews"][0]["userName"], "Sam");
        assert!(json["reviews"][0].get("clientIp").is_none());
    }
}
