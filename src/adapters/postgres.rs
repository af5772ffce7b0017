use crate::domain::model::RoadRecord;
use crate::domain::ports::RoadStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, QueryBuilder};

const CREATE_ROADS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS roads (
    road_id    VARCHAR PRIMARY KEY,
    road_name  TEXT NOT NULL,
    road_type  TEXT NOT NULL,
    lat        DOUBLE PRECISION NOT NULL,
    lon        DOUBLE PRECISION NOT NULL,
    geom       TEXT,
    loaded_at  TIMESTAMPTZ NOT NULL
)";

/// 每個 INSERT 語句最多帶的列數
const INSERT_CHUNK_SIZE: usize = 500;

pub struct PgRoadStore {
    pool: PgPool,
}

impl PgRoadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 每次執行只開一條連線，用到結束
    pub async fn connect(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

impl RoadStore for PgRoadStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_ROADS_TABLE).execute(&self.pool).await?;
        tracing::debug!("Ensured the roads table exists");
        Ok(())
    }

    async fn insert_roads(&self, roads: &[RoadRecord]) -> Result<u64> {
        let loaded_at = Utc::now();
        let mut inserted = 0u64;

        for chunk in roads.chunks(INSERT_CHUNK_SIZE) {
            let result = build_insert(chunk, loaded_at)
                .build()
                .execute(&self.pool)
                .await?;
            inserted += result.rows_affected();
        }

        Ok(inserted)
    }
}

/// 重複的 road_id 直接略過，重跑只會補新資料
fn build_insert<'args>(
    chunk: &'args [RoadRecord],
    loaded_at: DateTime<Utc>,
) -> QueryBuilder<'args, Postgres> {
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO roads (road_id, road_name, road_type, lat, lon, geom, loaded_at) ",
    );

    query_builder.push_values(chunk.iter(), |mut b, road| {
        b.push_bind(&road.road_id)
            .push_bind(&road.road_name)
            .push_bind(&road.road_type)
            .push_bind(road.lat)
            .push_bind(road.lon)
            .push_bind(road.geom.as_deref())
            .push_bind(loaded_at);
    });
    query_builder.push(" ON CONFLICT (road_id) DO NOTHING");

    query_builder
}
