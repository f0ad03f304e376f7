//! In-memory store seeded with a small, hand-checkable data set.
//!
//! Taiwan / Semiconductor: 2330, 2303, 2454, 3711
//! Taiwan / Shipping:      2603, 2609
//! United States / Semiconductor: NVDA, AMD

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Single-connection pool over a private in-memory database with the schema applied.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(5))
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    pool
}

pub async fn seeded_pool() -> SqlitePool {
    let pool = memory_pool().await;
    seed(&pool).await;
    pool
}

async fn exec(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.expect(sql);
}

pub async fn seed(pool: &SqlitePool) {
    exec(pool, "INSERT INTO Countrys (country_id, country_name) VALUES (1, 'Taiwan'), (2, 'United States')").await;
    exec(pool, "INSERT INTO Sectors (sector_id, sector_name) VALUES (1, 'Semiconductor'), (2, 'Shipping')").await;
    exec(
        pool,
        "INSERT INTO Companies (company_id, stock_symbol, company_name, sector_id, country_id) VALUES
            (1, '2330', 'TSMC', 1, 1),
            (2, '2303', 'UMC', 1, 1),
            (3, '2454', 'MediaTek', 1, 1),
            (4, '3711', 'ASE Technology', 1, 1),
            (5, '2603', 'Evergreen Marine', 2, 1),
            (6, '2609', 'Yang Ming Marine', 2, 1),
            (7, 'NVDA', 'NVIDIA', 1, 2),
            (8, 'AMD', 'Advanced Micro Devices', 1, 2)",
    )
    .await;

    // Annual (accumulated, Q4) income statements for 2023. 2609 revenue undisclosed.
    exec(
        pool,
        "INSERT INTO Income_Statements
            (company_id, year, quarter, report_type, revenue, gross_profit, net_income, gross_profit_pct)
         VALUES
            (1, 2023, 4, 'accumulated', 2161736.25, 1175111, 838498, 54.36),
            (2, 2023, 4, 'accumulated', 222533, 74111, 60989, 33.3),
            (3, 2023, 4, 'accumulated', 433446, 206633, 77195, 47.67),
            (4, 2023, 4, 'accumulated', 581914, 92197, 31680, 15.84),
            (5, 2023, 4, 'accumulated', 272055, 27434, 26521, 10.08),
            (6, 2023, 4, 'accumulated', NULL, 10203, 5463, NULL),
            (7, 2023, 4, 'accumulated', 60922, 44301, 29760, 72.72),
            (8, 2023, 4, 'accumulated', 22680, 10460, 854, 46.12)",
    )
    .await;

    // Q1 2023 quarterly income statements; 2454 and 2303 tie on revenue.
    exec(
        pool,
        "INSERT INTO Income_Statements (company_id, year, quarter, report_type, revenue, net_income)
         VALUES
            (1, 2023, 1, 'quarterly', 508633, 206987),
            (2, 2023, 1, 'quarterly', 54209, 16200),
            (3, 2023, 1, 'quarterly', 54209, 11620),
            (4, 2023, 1, 'quarterly', 130881, NULL)",
    )
    .await;

    // 3711 has no operating cash flow; 2330 has no net change in cash.
    exec(
        pool,
        "INSERT INTO Cash_Flow_Statements
            (company_id, year, quarter, report_type, operating_cash_flow, free_cash_flow, net_change_in_cash)
         VALUES
            (1, 2023, 4, 'accumulated', 1241967, 289123, NULL),
            (2, 2023, 4, 'accumulated', 91620, 41208, 12866),
            (3, 2023, 4, 'accumulated', 98823, 94330, -5912),
            (4, 2023, 4, 'accumulated', NULL, 30211, 8711),
            (5, 2023, 4, 'accumulated', 65232, 51120, 20313)",
    )
    .await;

    exec(
        pool,
        "INSERT INTO Balance_Sheets
            (company_id, year, quarter, report_type, inventory, inventory_pct, total_assets)
         VALUES
            (1, 2023, 2, 'quarterly', 250997, 4.93, 5091213),
            (2, 2023, 2, 'quarterly', 23770, 5.88, 404162),
            (3, 2023, 2, 'quarterly', 51342, 8.37, 613391)",
    )
    .await;
}

/// Adds `n` companies in their own sector ("Bulk") with 2022 annual revenue.
/// Every seventh company has a NULL revenue and values repeat every ten rows,
/// so the set exercises both null ordering and ties.
pub async fn seed_bulk(pool: &SqlitePool, n: i64) {
    exec(pool, "INSERT INTO Sectors (sector_id, sector_name) VALUES (9, 'Bulk')").await;
    for i in 0..n {
        let company_id = 1000 + i;
        sqlx::query(
            "INSERT INTO Companies (company_id, stock_symbol, company_name, sector_id, country_id)
             VALUES (?, ?, ?, 9, 1)",
        )
        .bind(company_id)
        .bind(format!("B{company_id}"))
        .bind(format!("Bulk Co {i}"))
        .execute(pool)
        .await
        .expect("bulk company");

        let revenue = if i % 7 == 0 { None } else { Some((i % 10) * 1000) };
        sqlx::query(
            "INSERT INTO Income_Statements (company_id, year, quarter, report_type, revenue)
             VALUES (?, 2022, 4, 'accumulated', ?)",
        )
        .bind(company_id)
        .bind(revenue)
        .execute(pool)
        .await
        .expect("bulk income statement");
    }
}
