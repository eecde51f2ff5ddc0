// SQLite-backed listing repository.
//
// One `listings` table holds the full record; photos are stored as a JSON
// array of transport file ids. Status transitions use a guarded UPDATE so a
// redundant transition is detected rather than rewritten.

use crate::core::listings::{
    DealKind, Language, Listing, ListingError, ListingStatus, ListingStore, NewListing,
    SearchFilter, StatusChange,
};
use crate::core::moderation::geo::Coordinate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

#[derive(Clone)]
pub struct SqliteListingStore {
    pool: Pool<Sqlite>,
}

impl SqliteListingStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ListingError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                language TEXT NOT NULL,
                deal TEXT NOT NULL,
                property_type TEXT NOT NULL,
                district TEXT NOT NULL,
                price INTEGER NOT NULL,
                area_sqm INTEGER NOT NULL,
                bedrooms INTEGER NOT NULL,
                bathrooms INTEGER NOT NULL,
                description TEXT NOT NULL,
                contact TEXT NOT NULL,
                license_no TEXT NOT NULL,
                deed_no TEXT,
                latitude REAL,
                longitude REAL,
                photos TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_listings_status_created
                ON listings(status, created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_listings_owner
                ON listings(owner_id, created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> ListingError {
    ListingError::Storage(e.to_string())
}

fn row_to_listing(row: &SqliteRow) -> Result<Listing, ListingError> {
    let status_str: String = row.get("status");
    let status = ListingStatus::parse(&status_str)
        .ok_or_else(|| ListingError::Storage(format!("unknown status {status_str:?}")))?;

    let deal_str: String = row.get("deal");
    let deal = DealKind::parse(&deal_str)
        .ok_or_else(|| ListingError::Storage(format!("unknown deal kind {deal_str:?}")))?;

    let language_str: String = row.get("language");
    let language = Language::parse(&language_str)
        .ok_or_else(|| ListingError::Storage(format!("unknown language {language_str:?}")))?;

    let photos_json: String = row.get("photos");
    let photos: Vec<String> = serde_json::from_str(&photos_json).unwrap_or_default();

    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    let location = match (
        row.get::<Option<f64>, _>("latitude"),
        row.get::<Option<f64>, _>("longitude"),
    ) {
        (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
        _ => None,
    };

    Ok(Listing {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        language,
        deal,
        property_type: row.get("property_type"),
        district: row.get("district"),
        price: row.get::<i64, _>("price") as u64,
        area_sqm: row.get::<i64, _>("area_sqm") as u64,
        bedrooms: row.get::<i64, _>("bedrooms") as u32,
        bathrooms: row.get::<i64, _>("bathrooms") as u32,
        description: row.get("description"),
        contact: row.get("contact"),
        license_no: row.get("license_no"),
        deed_no: row.get("deed_no"),
        location,
        photos,
        status,
        created_at,
    })
}

#[async_trait]
impl ListingStore for SqliteListingStore {
    async fn create(&self, listing: NewListing) -> Result<i64, ListingError> {
        let photos_json =
            serde_json::to_string(&listing.photos).map_err(|e| ListingError::Storage(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO listings (
                owner_id, language, deal, property_type, district, price, area_sqm,
                bedrooms, bathrooms, description, contact, license_no, deed_no,
                latitude, longitude, photos, status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(listing.owner_id)
        .bind(listing.language.as_str())
        .bind(listing.deal.as_str())
        .bind(&listing.property_type)
        .bind(&listing.district)
        .bind(listing.price as i64)
        .bind(listing.area_sqm as i64)
        .bind(listing.bedrooms as i64)
        .bind(listing.bathrooms as i64)
        .bind(&listing.description)
        .bind(&listing.contact)
        .bind(&listing.license_no)
        .bind(&listing.deed_no)
        .bind(listing.location.map(|c| c.lat))
        .bind(listing.location.map(|c| c.lon))
        .bind(&photos_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Option<Listing>, ListingError> {
        let row = sqlx::query("SELECT * FROM listings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.as_ref().map(row_to_listing).transpose()
    }

    async fn set_status(
        &self,
        id: i64,
        status: ListingStatus,
    ) -> Result<StatusChange, ListingError> {
        let result = sqlx::query("UPDATE listings SET status = ?2 WHERE id = ?1 AND status <> ?2")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() > 0 {
            return Ok(StatusChange::Changed);
        }

        // Nothing written: either the row is already in that status or the
        // id does not exist.
        let row = sqlx::query("SELECT 1 FROM listings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some(_) => Ok(StatusChange::AlreadySet),
            None => Err(ListingError::NotFound(id)),
        }
    }

    async fn list_by_owner(&self, owner_id: i64, limit: u32) -> Result<Vec<Listing>, ListingError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM listings
            WHERE owner_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(owner_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter().map(row_to_listing).collect()
    }

    async fn list_pending(&self, limit: u32) -> Result<Vec<Listing>, ListingError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM listings
            WHERE status = 'pending'
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter().map(row_to_listing).collect()
    }

    async fn search(&self, filter: &SearchFilter, limit: u32) -> Result<Vec<Listing>, ListingError> {
        // Assembled clause by clause; binds are pushed in the same order the
        // placeholders appear. instr() keeps the district match case-sensitive
        // (LIKE would fold ASCII case).
        let mut sql = String::from("SELECT * FROM listings WHERE status = 'approved'");
        if filter.deal.is_some() {
            sql.push_str(" AND deal = ?");
        }
        if filter.min_price.is_some() {
            sql.push_str(" AND price >= ?");
        }
        if filter.max_price.is_some() {
            sql.push_str(" AND price <= ?");
        }
        if filter.district_contains.is_some() {
            sql.push_str(" AND instr(district, ?) > 0");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");

        let mut query = sqlx::query(&sql);
        if let Some(deal) = filter.deal {
            query = query.bind(deal.as_str());
        }
        if let Some(min) = filter.min_price {
            query = query.bind(min as i64);
        }
        if let Some(max) = filter.max_price {
            query = query.bind(max as i64);
        }
        if let Some(district) = &filter.district_contains {
            query = query.bind(district);
        }
        query = query.bind(limit as i64);

        let rows = query.fetch_all(&self.pool).await.map_err(storage_err)?;
        rows.iter().map(row_to_listing).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store() -> (SqliteListingStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.db");
        let pool = SqlitePoolOptions::new()
            .connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        let store = SqliteListingStore::new(pool);
        store.migrate().await.unwrap();
        (store, dir)
    }

    fn new_listing(owner_id: i64, deal: DealKind, district: &str, price: u64) -> NewListing {
        NewListing {
            owner_id,
            language: Language::Arabic,
            deal,
            property_type: "شقة".to_string(),
            district: district.to_string(),
            price,
            area_sqm: 150,
            bedrooms: 3,
            bathrooms: 2,
            description: "وصف مختصر".to_string(),
            contact: "0501234567".to_string(),
            license_no: "12345678".to_string(),
            deed_no: Some("98765".to_string()),
            location: Some(Coordinate {
                lat: 24.7,
                lon: 46.7,
            }),
            photos: vec!["file-a".to_string(), "file-b".to_string()],
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_every_field() {
        let (store, _dir) = store().await;
        let id = store
            .create(new_listing(5, DealKind::Rent, "Olaya", 30_000))
            .await
            .unwrap();

        let listing = store.get(id).await.unwrap().unwrap();
        assert_eq!(listing.id, id);
        assert_eq!(listing.owner_id, 5);
        assert_eq!(listing.deal, DealKind::Rent);
        assert_eq!(listing.district, "Olaya");
        assert_eq!(listing.price, 30_000);
        assert_eq!(listing.deed_no.as_deref(), Some("98765"));
        assert_eq!(
            listing.location,
            Some(Coordinate {
                lat: 24.7,
                lon: 46.7
            })
        );
        assert_eq!(listing.photos, vec!["file-a", "file-b"]);
        assert_eq!(listing.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn ids_are_assigned_monotonically() {
        let (store, _dir) = store().await;
        let a = store
            .create(new_listing(1, DealKind::Sale, "النرجس", 1_000_000))
            .await
            .unwrap();
        let b = store
            .create(new_listing(1, DealKind::Sale, "النرجس", 1_100_000))
            .await
            .unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn missing_listing_is_none() {
        let (store, _dir) = store().await;
        assert!(store.get(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_status_reports_redundant_transitions() {
        let (store, _dir) = store().await;
        let id = store
            .create(new_listing(1, DealKind::Sale, "الياسمين", 900_000))
            .await
            .unwrap();

        assert_eq!(
            store.set_status(id, ListingStatus::Approved).await.unwrap(),
            StatusChange::Changed
        );
        assert_eq!(
            store.set_status(id, ListingStatus::Approved).await.unwrap(),
            StatusChange::AlreadySet
        );
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            ListingStatus::Approved
        );

        match store.set_status(404, ListingStatus::Rejected).await {
            Err(ListingError::NotFound(404)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn list_by_owner_is_most_recent_first_and_capped() {
        let (store, _dir) = store().await;
        let mut ids = Vec::new();
        for price in [100, 200, 300] {
            ids.push(
                store
                    .create(new_listing(9, DealKind::Rent, "الملز", price))
                    .await
                    .unwrap(),
            );
        }
        store
            .create(new_listing(8, DealKind::Rent, "الملز", 400))
            .await
            .unwrap();

        let rows = store.list_by_owner(9, 2).await.unwrap();
        let got: Vec<i64> = rows.iter().map(|l| l.id).collect();
        assert_eq!(got, vec![ids[2], ids[1]]);
    }

    #[tokio::test]
    async fn search_filters_approved_listings_only() {
        let (store, _dir) = store().await;

        let sale_olaya = store
            .create(new_listing(1, DealKind::Sale, "حي العليا Olaya", 500_000))
            .await
            .unwrap();
        let sale_pricey = store
            .create(new_listing(2, DealKind::Sale, "حي العليا Olaya", 2_000_000))
            .await
            .unwrap();
        let rent_olaya = store
            .create(new_listing(3, DealKind::Rent, "حي العليا Olaya", 800_000))
            .await
            .unwrap();
        let sale_pending = store
            .create(new_listing(4, DealKind::Sale, "حي العليا Olaya", 700_000))
            .await
            .unwrap();
        let sale_other = store
            .create(new_listing(5, DealKind::Sale, "حي النرجس", 600_000))
            .await
            .unwrap();

        for id in [sale_olaya, sale_pricey, rent_olaya, sale_other] {
            store.set_status(id, ListingStatus::Approved).await.unwrap();
        }
        let _ = sale_pending;

        let filter = SearchFilter {
            deal: Some(DealKind::Sale),
            min_price: Some(300_000),
            max_price: Some(1_500_000),
            district_contains: Some("Olaya".to_string()),
        };
        let rows = store.search(&filter, 10).await.unwrap();
        let got: Vec<i64> = rows.iter().map(|l| l.id).collect();
        assert_eq!(got, vec![sale_olaya]);
    }

    #[tokio::test]
    async fn district_search_is_case_sensitive() {
        let (store, _dir) = store().await;
        let id = store
            .create(new_listing(1, DealKind::Sale, "Olaya district", 500_000))
            .await
            .unwrap();
        store.set_status(id, ListingStatus::Approved).await.unwrap();

        let hit = SearchFilter {
            district_contains: Some("Olaya".to_string()),
            ..Default::default()
        };
        assert_eq!(store.search(&hit, 10).await.unwrap().len(), 1);

        let miss = SearchFilter {
            district_contains: Some("olaya".to_string()),
            ..Default::default()
        };
        assert!(store.search(&miss, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_is_most_recent_first_and_capped() {
        let (store, _dir) = store().await;
        let mut ids = Vec::new();
        for price in [100_000, 200_000, 300_000] {
            let id = store
                .create(new_listing(1, DealKind::Sale, "حطين", price))
                .await
                .unwrap();
            store.set_status(id, ListingStatus::Approved).await.unwrap();
            ids.push(id);
        }

        let rows = store.search(&SearchFilter::default(), 2).await.unwrap();
        let got: Vec<i64> = rows.iter().map(|l| l.id).collect();
        assert_eq!(got, vec![ids[2], ids[1]]);
    }
}
