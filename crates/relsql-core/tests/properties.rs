mod common;

use common::{
    SoftDeleteFilter, count_question_marks, dollar_placeholders, inline_pg, posts, users,
    users_with_posts,
};
use relsql_core::{
    DeleteManager, FormattedRenderer, InsertManager, MysqlRenderer, Node, PostgresRenderer,
    QueryRenderer, Renderer, SelectManager, SqlValue, SqliteRenderer, UpdateManager, count_star,
    exists, sql_with_binds,
};

/// A query exercising most places a value can appear.
fn busy_query() -> SelectManager {
    let users = users();
    let posts = posts();
    let recent = SelectManager::new(&posts)
        .where_clause(posts.attr("author_id").eq(users.attr("id")))
        .where_clause(posts.attr("score").gt(3.5));
    SelectManager::new(&users)
        .project([
            users.attr("name"),
            relsql_core::simple_case(users.attr("role"))
                .when("admin", 1)
                .otherwise(0)
                .end()
                .alias("rank"),
        ])
        .where_clause(users.attr("age").between(18, 65))
        .where_clause(users.attr("nick").eq(None::<String>))
        .where_clause(users.attr("id").in_list([1, 2, 3]))
        .where_clause(exists(&recent))
        .where_clause(sql_with_binds("\"users\".\"score\" > $10", [10]))
        .group([users.attr("role")])
        .having(count_star().gt(2))
        .limit(5)
}

#[test]
fn test_postgres_placeholders_are_sequential() {
    let (sql, params) = busy_query().to_sql(&mut PostgresRenderer::new()).unwrap();
    let params = params.unwrap();
    let numbers = dollar_placeholders(&sql);
    // $10 is spelled by the raw fragment, which carries one bind
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    assert_eq!(params.len(), 12);
}

#[test]
fn test_question_mark_count_matches_params() {
    let mut mysql = MysqlRenderer::new();
    let mut sqlite = SqliteRenderer::new();
    let renderers: [&mut dyn QueryRenderer; 2] = [&mut mysql, &mut sqlite];
    for renderer in renderers {
        let (sql, params) = busy_query().to_sql(renderer).unwrap();
        let params = params.unwrap();
        // the raw fragment's bind has no `?` in its text
        assert_eq!(count_question_marks(&sql), params.len() - 1, "{sql}");
    }
}

#[test]
fn test_rendering_is_deterministic() {
    let query = busy_query();
    let mut r = PostgresRenderer::new();
    let first = query.to_sql(&mut r).unwrap();
    let second = query.to_sql(&mut r).unwrap();
    let fresh = query.to_sql(&mut PostgresRenderer::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, fresh);
}

#[test]
fn test_nulls_never_bound() {
    let users = users();
    let (sql, params) = UpdateManager::new(&users)
        .set(users.attr("nick"), None::<i64>)
        .set(users.attr("bio"), SqlValue::Null)
        .where_clause(users.attr("id").eq(1))
        .to_sql(&mut PostgresRenderer::new())
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE \"users\" SET \"users\".\"nick\" = NULL, \"users\".\"bio\" = NULL \
         WHERE \"users\".\"id\" = $1"
    );
    let params = params.unwrap();
    assert_eq!(params, vec![SqlValue::Int(1)]);
    assert!(params.iter().all(|p| !p.is_null()));
}

#[test]
fn test_original_statement_unchanged_for_every_kind() {
    let users = users();

    let select = users_with_posts().use_transformer(SoftDeleteFilter);
    let before = select.core().clone();
    select.to_sql(&mut PostgresRenderer::new()).unwrap();
    assert_eq!(select.core(), &before);

    let update = UpdateManager::new(&users)
        .set(users.attr("name"), "x")
        .use_transformer(SoftDeleteFilter);
    let before = update.statement().clone();
    let (sql, _) = update.to_sql(&mut PostgresRenderer::new()).unwrap();
    assert!(sql.ends_with("WHERE \"users\".\"deleted_at\" IS NULL"));
    assert_eq!(update.statement(), &before);

    let delete = DeleteManager::new(&users).use_transformer(SoftDeleteFilter);
    let before = delete.statement().clone();
    delete.to_sql(&mut PostgresRenderer::new()).unwrap();
    assert_eq!(delete.statement(), &before);
    assert!(delete.statement().wheres.is_empty());
}

#[test]
fn test_empty_clauses_emit_no_keywords() {
    let (sql, _) = SelectManager::new(users()).to_sql(&mut inline_pg()).unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\"");
    for keyword in ["WHERE", "GROUP BY", "HAVING", "ORDER BY", "LIMIT"] {
        assert!(!sql.contains(keyword));
    }
}

#[test]
fn test_count_star_in_every_dialect() {
    let node = count_star();
    let mut pg = PostgresRenderer::new();
    let mut my = MysqlRenderer::new();
    let mut lite = SqliteRenderer::new();
    assert_eq!(pg.render(&node), "COUNT(*)");
    assert_eq!(my.render(&node), "COUNT(*)");
    assert_eq!(lite.render(&node), "COUNT(*)");
    assert!(pg.state().params().is_empty());
}

#[test]
fn test_not_and_or_are_parenthesised() {
    let users = users();
    let mut r = inline_pg();
    assert_eq!(
        r.render(&users.attr("age").gt(1).not()),
        "NOT (\"users\".\"age\" > 1)"
    );
    assert_eq!(
        r.render(&users.attr("a").eq(1).or(users.attr("b").eq(2))),
        "(\"users\".\"a\" = 1 OR \"users\".\"b\" = 2)"
    );
}

#[test]
fn test_limit_binds_value() {
    let mut r = PostgresRenderer::new();
    assert_eq!(r.render(&Node::bind(10u64)), "$1");
    assert_eq!(r.state().params(), &[SqlValue::UInt(10)]);
}

#[test]
fn test_insert_values_keep_positional_order() {
    let users = users();
    let (_, params) = InsertManager::new(&users)
        .columns([users.attr("a"), users.attr("b"), users.attr("c")])
        .values([Node::from(1), Node::from("two"), Node::from(3.0)])
        .values([Node::from(4), Node::null(), Node::from(false)])
        .to_sql(&mut MysqlRenderer::new())
        .unwrap();
    assert_eq!(
        params,
        Some(vec![
            SqlValue::Int(1),
            SqlValue::from("two"),
            SqlValue::Float(3.0),
            SqlValue::Int(4),
            SqlValue::Bool(false),
        ])
    );
}

#[test]
fn default_renderers_parameterise() {
    let users = users();
    let query = SelectManager::new(&users).where_clause(users.attr("name").eq("x' OR 1=1 --"));
    let bound = Some(vec![SqlValue::from("x' OR 1=1 --")]);

    let (sql, params) = query.to_sql(&mut PostgresRenderer::default()).unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"users\".\"name\" = $1");
    assert_eq!(params, bound);

    let (sql, params) = query.to_sql(&mut MysqlRenderer::default()).unwrap();
    assert_eq!(sql, "SELECT * FROM `users` WHERE `users`.`name` = ?");
    assert_eq!(params, bound);

    let (sql, params) = query.to_sql(&mut SqliteRenderer::default()).unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"users\".\"name\" = ?");
    assert_eq!(params, bound);

    let (sql, params) = query
        .to_sql(&mut FormattedRenderer::<PostgresRenderer>::default())
        .unwrap();
    assert!(sql.ends_with("WHERE \"users\".\"name\" = $1"));
    assert_eq!(params, bound);
}
