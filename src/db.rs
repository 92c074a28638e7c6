// ==========================================
// 球探招募管理平台 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句，保证测试库与生产库结构一致
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库文件名
pub const DB_FILE_NAME: &str = "scout_hub.db";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 默认数据库路径（用户数据目录下）
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scout-hub")
        .join(DB_FILE_NAME)
}

/// 初始化数据库 schema（幂等）
///
/// # 说明
/// - 所有建表语句使用 IF NOT EXISTS，可重复执行
/// - 唯一性约束（球员/教练同名同俱乐部、候选名单条目去重、用户外部ID）
///   由数据库层作为最终防线，应用层检查仅用于提前给出更友好的错误消息
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    // users 表
    // external_id: 外部身份服务的用户标识，首次登录时落库
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT,
            last_name TEXT,
            avatar_url TEXT,
            role TEXT NOT NULL,
            organization_id TEXT,
            organization_name TEXT,
            preferences_json TEXT,
            timezone TEXT NOT NULL DEFAULT 'UTC',
            language TEXT NOT NULL DEFAULT 'en',
            is_active INTEGER NOT NULL DEFAULT 1,
            last_login_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // players 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            player_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            full_name TEXT,
            date_of_birth TEXT,
            nationality TEXT,
            second_nationality TEXT,
            height_cm INTEGER,
            weight_kg INTEGER,
            preferred_foot TEXT,
            current_club TEXT,
            position TEXT NOT NULL,
            shirt_number INTEGER,
            contract_expires TEXT,
            market_value_eur INTEGER,
            weekly_wage_eur INTEGER,
            agent_name TEXT,
            scouting_notes TEXT,
            overall_rating INTEGER,
            potential_rating INTEGER,
            availability_status TEXT NOT NULL DEFAULT 'available',
            created_by TEXT REFERENCES users(user_id),
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 同名同俱乐部的在档球员唯一（软删除后允许重建）
    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_players_name_club_active
        ON players (name, current_club) WHERE is_active = 1
        "#,
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_players_position ON players (position)",
        [],
    )?;

    // coaches 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS coaches (
            coach_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            full_name TEXT,
            date_of_birth TEXT,
            nationality TEXT,
            current_club TEXT,
            current_role TEXT,
            coaching_level TEXT,
            years_experience INTEGER,
            contract_expires TEXT,
            estimated_salary_eur INTEGER,
            preferred_formation TEXT,
            leadership_style TEXT,
            scouting_notes TEXT,
            overall_rating INTEGER,
            availability_status TEXT NOT NULL DEFAULT 'available',
            created_by TEXT REFERENCES users(user_id),
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_coaches_name_club_active
        ON coaches (name, current_club) WHERE is_active = 1
        "#,
        [],
    )?;

    // shortlists 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS shortlists (
            shortlist_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            list_type TEXT NOT NULL,
            created_by TEXT NOT NULL REFERENCES users(user_id),
            organization_id TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            priority TEXT NOT NULL DEFAULT 'medium',
            category TEXT,
            season TEXT,
            deadline TEXT,
            budget_eur INTEGER,
            target_count INTEGER,
            completed_count INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // shortlist_items 表
    // - player_id/coach_id 恰好一个非空（CHECK 约束兜底，领域层用 EntityRef 保证）
    // - (shortlist_id, player_id) / (shortlist_id, coach_id) 唯一，
    //   作为并发重复添加的最终防线
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS shortlist_items (
            item_id TEXT PRIMARY KEY,
            shortlist_id TEXT NOT NULL REFERENCES shortlists(shortlist_id) ON DELETE CASCADE,
            player_id TEXT REFERENCES players(player_id),
            coach_id TEXT REFERENCES coaches(coach_id),
            status TEXT NOT NULL DEFAULT 'identified',
            priority INTEGER NOT NULL DEFAULT 3,
            notes TEXT,
            fit_analysis TEXT,
            scout_rating INTEGER,
            estimated_fee_eur INTEGER,
            wage_demands_eur INTEGER,
            contract_length_years INTEGER,
            target_completion_date TEXT,
            last_contacted_date TEXT,
            contact_attempts INTEGER NOT NULL DEFAULT 0,
            meetings_held INTEGER NOT NULL DEFAULT 0,
            offers_made INTEGER NOT NULL DEFAULT 0,
            contact_history TEXT NOT NULL DEFAULT '[]',
            added_by TEXT REFERENCES users(user_id),
            last_updated_by TEXT REFERENCES users(user_id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (
                (player_id IS NOT NULL AND coach_id IS NULL) OR
                (player_id IS NULL AND coach_id IS NOT NULL)
            ),
            UNIQUE (shortlist_id, player_id),
            UNIQUE (shortlist_id, coach_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_shortlist ON shortlist_items (shortlist_id)",
        [],
    )?;

    // reports 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            report_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            report_type TEXT NOT NULL,
            parameters_json TEXT NOT NULL,
            filters_json TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            file_path TEXT,
            file_name TEXT,
            file_size INTEGER,
            file_format TEXT NOT NULL DEFAULT 'pdf',
            page_count INTEGER,
            generated_by TEXT NOT NULL REFERENCES users(user_id),
            generated_at TEXT,
            expires_at TEXT NOT NULL,
            download_count INTEGER NOT NULL DEFAULT 0,
            last_downloaded_at TEXT,
            error_message TEXT,
            retry_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // activity_log 表（平台级审计，只追加）
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS activity_log (
            log_id TEXT PRIMARY KEY,
            user_id TEXT,
            action TEXT NOT NULL,
            resource_type TEXT NOT NULL,
            resource_id TEXT,
            resource_name TEXT,
            details_json TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_activity_resource ON activity_log (resource_type, resource_id)",
        [],
    )?;

    // settings_kv 表（global scope 键值配置）
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS settings_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        )
        "#,
        [],
    )?;

    Ok(())
}
