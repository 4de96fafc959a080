use sqlx::PgPool;

/// 建表语句; 候选键列带唯一约束, 作为并发导入的最终防线
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS medicines (
        id                 BIGSERIAL PRIMARY KEY,
        sequence_no        INTEGER NOT NULL UNIQUE,
        supplier           TEXT NOT NULL DEFAULT '',
        manufacturer       TEXT NOT NULL DEFAULT '',
        code               TEXT NOT NULL UNIQUE,
        name               TEXT NOT NULL DEFAULT '',
        spec               TEXT NOT NULL DEFAULT '',
        base_price         DOUBLE PRECISION NOT NULL DEFAULT 0,
        location           TEXT NOT NULL DEFAULT '',
        prev_stock         DOUBLE PRECISION NOT NULL DEFAULT 0,
        prev_amount        DOUBLE PRECISION NOT NULL DEFAULT 0,
        in_qty             DOUBLE PRECISION NOT NULL DEFAULT 0,
        in_amount          DOUBLE PRECISION NOT NULL DEFAULT 0,
        out_qty            DOUBLE PRECISION NOT NULL DEFAULT 0,
        out_amount         DOUBLE PRECISION NOT NULL DEFAULT 0,
        stock_qty          DOUBLE PRECISION NOT NULL DEFAULT 0,
        purchased_qty      DOUBLE PRECISION NOT NULL DEFAULT 0,
        unit_price         DOUBLE PRECISION NOT NULL DEFAULT 0,
        base_price_percent DOUBLE PRECISION NOT NULL DEFAULT 0,
        stock_amount       DOUBLE PRECISION NOT NULL DEFAULT 0,
        base_price_code    TEXT NOT NULL DEFAULT '',
        remarks            TEXT NOT NULL DEFAULT '',
        standard_code      TEXT NOT NULL DEFAULT '',
        product_location   TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vendor_clients (
        id               BIGSERIAL PRIMARY KEY,
        classification   TEXT NOT NULL DEFAULT '',
        code             TEXT NOT NULL UNIQUE,
        name_internal    TEXT NOT NULL DEFAULT '',
        name_original    TEXT NOT NULL DEFAULT '',
        representative   TEXT NOT NULL DEFAULT '',
        dob              DATE,
        business_number  TEXT NOT NULL DEFAULT '',
        phone            TEXT NOT NULL DEFAULT '',
        fax              TEXT NOT NULL DEFAULT '',
        zip              TEXT NOT NULL DEFAULT '',
        address          TEXT NOT NULL DEFAULT '',
        sales_rep        TEXT NOT NULL DEFAULT '',
        dept_head        TEXT NOT NULL DEFAULT '',
        price_apply      TEXT NOT NULL DEFAULT '',
        stock_apply      TEXT NOT NULL DEFAULT '',
        invoice_issue    BOOLEAN NOT NULL DEFAULT FALSE,
        business_type    TEXT NOT NULL DEFAULT '',
        item             TEXT NOT NULL DEFAULT '',
        client_type      TEXT NOT NULL DEFAULT '',
        client_group     TEXT NOT NULL DEFAULT '',
        contract_type    TEXT NOT NULL DEFAULT '',
        delivery_type    TEXT NOT NULL DEFAULT '',
        pharmacist       TEXT NOT NULL DEFAULT '',
        license_no       TEXT NOT NULL DEFAULT '',
        care_no          TEXT NOT NULL DEFAULT '',
        narcotics_id     TEXT NOT NULL DEFAULT '',
        device_client    TEXT NOT NULL DEFAULT '',
        contact          TEXT NOT NULL DEFAULT '',
        email            TEXT NOT NULL DEFAULT '',
        invoice_manager  TEXT NOT NULL DEFAULT '',
        manager_phone    TEXT NOT NULL DEFAULT '',
        credit_limit     DOUBLE PRECISION NOT NULL DEFAULT 0,
        max_turn_days    INTEGER NOT NULL DEFAULT 0,
        monthly_estimate INTEGER NOT NULL DEFAULT 0,
        start_date       DATE,
        note1            TEXT NOT NULL DEFAULT '',
        note2            TEXT NOT NULL DEFAULT '',
        active           BOOLEAN NOT NULL DEFAULT FALSE,
        e_invoice        BOOLEAN NOT NULL DEFAULT FALSE,
        invoice_system   TEXT NOT NULL DEFAULT '',
        external_exclude BOOLEAN NOT NULL DEFAULT FALSE,
        pre_payment      BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vendor_ledger_entries (
        id          BIGSERIAL PRIMARY KEY,
        hospital_id VARCHAR(50) NOT NULL,
        entry_date  DATE NOT NULL,
        order_id    VARCHAR(100) NOT NULL,
        qty         INTEGER NOT NULL,
        unit_price  NUMERIC(15, 2) NOT NULL,
        amount      NUMERIC(15, 2) NOT NULL,
        remarks     VARCHAR(500) NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_ledger_hospital_date
        ON vendor_ledger_entries (hospital_id, entry_date)
    "#,
];

/// 确保业务表存在
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
