use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// DB 연결 타임아웃
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 모니터링 패스 하나가 쓰는 연결 풀 생성
///
/// 패스 하나에서 쿼리는 한 번뿐이라 풀 크기는 1로 둡니다.
pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(1)
        .min_connections(0)
        .connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("Successfully connected to the database.");

    Ok(db)
}
