mod common;

use common::{SoftDeleteFilter, TenantFilter, posts, users, users_with_posts};
use relsql_core::{
    DeleteManager, FormattedRenderer, GraphRenderer, InsertManager, MysqlRenderer,
    PostgresRenderer, QueryRenderer, SelectManager, SqlValue, table,
};

#[test]
fn test_formatted_select_layout() {
    let users = users();
    let posts = posts();
    let query = SelectManager::new(&users)
        .project([users.attr("id"), users.attr("name"), posts.attr("title")])
        .join(&posts)
        .on(users.attr("id").eq(posts.attr("author_id")))
        .where_clause(users.attr("active").eq(true))
        .where_clause(posts.attr("published").eq(true))
        .order([posts.attr("title").asc()])
        .limit(20);
    let mut r = FormattedRenderer::new(PostgresRenderer::new());
    let (sql, params) = query.to_sql(&mut r).unwrap();
    assert_eq!(
        sql,
        "SELECT \"users\".\"id\"\n\
         \t,\"users\".\"name\"\n\
         \t,\"posts\".\"title\"\n\
         FROM \"users\"\n\
         INNER JOIN \"posts\" ON \"users\".\"id\" = \"posts\".\"author_id\"\n\
         WHERE \"users\".\"active\" = $1\n\
         \tAND \"posts\".\"published\" = $2\n\
         ORDER BY \"posts\".\"title\" ASC\n\
         LIMIT $3"
    );
    assert_eq!(
        params,
        Some(vec![SqlValue::Bool(true), SqlValue::Bool(true), SqlValue::UInt(20)])
    );
}

#[test]
fn test_formatted_matches_flat_params() {
    let query = users_with_posts().use_transformer(TenantFilter(7));
    let (_, flat) = query.to_sql(&mut MysqlRenderer::new()).unwrap();
    let (pretty_sql, pretty) = query
        .to_sql(&mut FormattedRenderer::new(MysqlRenderer::new()))
        .unwrap();
    assert_eq!(flat, pretty);
    assert!(pretty_sql.contains("\n\tAND `posts`.`tenant_id` = ?"));
}

#[test]
fn test_formatted_insert_and_delete() {
    let tags = table("tags");
    let mut r = FormattedRenderer::new(PostgresRenderer::new());
    let (sql, _) = InsertManager::new(&tags)
        .columns([tags.attr("name")])
        .values(["a"])
        .values(["b"])
        .returning([tags.attr("id")])
        .to_sql(&mut r)
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"tags\" (\"name\")\nVALUES ($1)\n\t,($2)\nRETURNING \"tags\".\"id\""
    );

    let (sql, _) = DeleteManager::new(&tags)
        .where_clause(tags.attr("name").eq("a"))
        .where_clause(tags.attr("uses").eq(0))
        .to_sql(&mut r)
        .unwrap();
    assert_eq!(
        sql,
        "DELETE FROM \"tags\"\nWHERE \"tags\".\"name\" = $1\n\tAND \"tags\".\"uses\" = $2"
    );
}

#[test]
fn test_graph_renderer_through_to_sql() {
    let users = users();
    let query = SelectManager::new(&users).where_clause(users.attr("id").eq(1));
    let mut graph = GraphRenderer::new();
    let (dot, params) = query.to_sql(&mut graph).unwrap();
    assert!(dot.starts_with("digraph AST {"));
    assert!(dot.trim_end().ends_with('}'));
    assert!(params.is_none());
    assert!(graph.params().is_none());
}

#[test]
fn test_graph_clusters_name_transformers() {
    let dot = users_with_posts()
        .use_transformer(SoftDeleteFilter)
        .use_transformer(TenantFilter(1))
        .to_graph()
        .unwrap();
    assert!(dot.contains("subgraph cluster_0 {"));
    assert!(dot.contains("label=\"soft_delete\";"));
    assert!(dot.contains("subgraph cluster_1 {"));
    assert!(dot.contains("label=\"tenant\";"));
    assert!(dot.contains("style=dashed"));
}

#[test]
fn test_graph_without_transformers_has_no_clusters() {
    let dot = users_with_posts().to_graph().unwrap();
    assert!(!dot.contains("subgraph"));
    assert!(dot.contains("Join"));
}
