mod common;

use common::{DenyTable, SoftDeleteFilter, TenantFilter, inline_pg, posts, users, users_with_posts};
use relsql_core::error::TransformError;
use relsql_core::{
    InsertManager, MysqlRenderer, PostgresRenderer, Renderer, SelectManager, SqlValue,
    SqliteRenderer, table,
};

#[test]
fn test_simple_select_without_parameters() {
    let users = users();
    let (sql, params) = SelectManager::new(&users)
        .where_clause(users.attr("active").eq(true))
        .to_sql(&mut inline_pg())
        .unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"users\".\"active\" = TRUE");
    assert!(params.unwrap_or_default().is_empty());
}

#[test]
fn test_mysql_join_with_binds() {
    let users = users();
    let posts = posts();
    let (sql, params) = SelectManager::new(&users)
        .project([users.attr("name"), users.attr("email")])
        .join(&posts)
        .on(users.attr("id").eq(posts.attr("author_id")))
        .where_clause(users.attr("active").eq(true))
        .where_clause(posts.attr("published").eq(true))
        .to_sql(&mut MysqlRenderer::new())
        .unwrap();
    assert_eq!(
        sql,
        "SELECT `users`.`name`, `users`.`email` FROM `users` INNER JOIN `posts` ON \
         `users`.`id` = `posts`.`author_id` WHERE `users`.`active` = ? AND `posts`.`published` = ?"
    );
    assert_eq!(params, Some(vec![SqlValue::Bool(true), SqlValue::Bool(true)]));
}

#[test]
fn test_postgres_limit_offset() {
    let (sql, params) = SelectManager::new(users())
        .limit(10)
        .offset(20)
        .to_sql(&mut PostgresRenderer::new())
        .unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" LIMIT $1 OFFSET $2");
    assert_eq!(params, Some(vec![SqlValue::UInt(10), SqlValue::UInt(20)]));
}

#[test]
fn test_sqlite_case_insensitive_eq() {
    let t = table("t");
    let mut r = SqliteRenderer::with_options(relsql_core::RenderOptions::inline());
    assert_eq!(
        r.render(&t.attr("name").case_insensitive_eq("alice")),
        "\"t\".\"name\" = 'alice' COLLATE NOCASE"
    );
}

#[test]
fn test_postgres_upsert_with_returning() {
    let users = users();
    let (sql, params) = InsertManager::new(&users)
        .columns([users.attr("email"), users.attr("name")])
        .values(["a@b.com", "Alice"])
        .on_conflict([users.attr("email")])
        .do_update()
        .set(users.attr("name"), "Alice")
        .finish()
        .returning([users.attr("id")])
        .to_sql(&mut PostgresRenderer::new())
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"users\" (\"email\", \"name\") VALUES ($1, $2) ON CONFLICT (\"email\") \
         DO UPDATE SET \"users\".\"name\" = $3 RETURNING \"users\".\"id\""
    );
    assert_eq!(
        params,
        Some(vec![
            SqlValue::from("a@b.com"),
            SqlValue::from("Alice"),
            SqlValue::from("Alice"),
        ])
    );
}

#[test]
fn test_transformers_compose_in_order() {
    let query = users_with_posts()
        .use_transformer(SoftDeleteFilter)
        .use_transformer(TenantFilter(42));
    let (sql, params) = query.to_sql(&mut PostgresRenderer::new()).unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" INNER JOIN \"posts\" ON \"users\".\"id\" = \"posts\".\"author_id\" \
         WHERE \"users\".\"deleted_at\" IS NULL AND \"posts\".\"deleted_at\" IS NULL \
         AND \"users\".\"tenant_id\" = $1 AND \"posts\".\"tenant_id\" = $2"
    );
    assert_eq!(params, Some(vec![SqlValue::Int(42), SqlValue::Int(42)]));
    assert!(query.core().wheres.is_empty());
}

#[test]
fn test_transformer_error_produces_no_sql() {
    let query = users_with_posts()
        .use_transformer(SoftDeleteFilter)
        .use_transformer(DenyTable("posts"))
        .use_transformer(TenantFilter(42));
    let err = query.to_sql(&mut PostgresRenderer::new()).unwrap_err();
    match err {
        TransformError::AccessDenied { table, .. } => assert_eq!(table, "posts"),
        other => panic!("expected access denied, got {other:?}"),
    }
    assert!(query.core().wheres.is_empty());
}

#[test]
fn test_aliased_subquery_as_join_source() {
    let users = users();
    let posts = posts();
    let counts = SelectManager::new(&posts)
        .project([posts.attr("author_id"), relsql_core::count_star().alias("n")])
        .group([posts.attr("author_id")])
        .alias("counts");
    let counts_author = counts.attr("author_id");
    let (sql, _) = SelectManager::new(&users)
        .project([users.attr("name"), counts.attr("n")])
        .left_join(&counts)
        .on(users.attr("id").eq(counts_author))
        .to_sql(&mut inline_pg())
        .unwrap();
    assert_eq!(
        sql,
        "SELECT \"users\".\"name\", \"counts\".\"n\" FROM \"users\" LEFT OUTER JOIN \
         (SELECT \"posts\".\"author_id\", COUNT(*) AS \"n\" FROM \"posts\" \
         GROUP BY \"posts\".\"author_id\") \"counts\" ON \"users\".\"id\" = \"counts\".\"author_id\""
    );
}
