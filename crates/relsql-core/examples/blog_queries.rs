//! Example: Blog Queries
//!
//! Builds the queries of a small blog once and renders them for every
//! dialect, with and without a soft-delete transformer.
//!
//! Run with: RUST_LOG=debug cargo run --example blog_queries -p relsql-core

use relsql_core::error::Result;
use relsql_core::transform::{Transformer, collect_tables};
use relsql_core::{
    Dialect, FormattedRenderer, InsertManager, PostgresRenderer, RenderOptions, SelectCore,
    SelectManager, count, count_star, table,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// =============================================================================
// Transformers
// =============================================================================

/// Hides rows whose `deleted_at` is set.
struct HideDeleted;

impl Transformer for HideDeleted {
    fn name(&self) -> &str {
        "hide_deleted"
    }

    fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
        for (relation, _) in collect_tables(&select) {
            select.wheres.push(relation.attr("deleted_at").is_null());
        }
        Ok(select)
    }
}

// =============================================================================
// Queries
// =============================================================================

fn published_posts() -> SelectManager {
    let users = table("users");
    let posts = table("posts");
    SelectManager::new(&posts)
        .project([posts.attr("title"), users.attr("name").alias("author")])
        .join(&users)
        .on(posts.attr("author_id").eq(users.attr("id")))
        .where_clause(posts.attr("published").eq(true))
        .order([posts.attr("created_at").desc()])
        .limit(10)
}

fn prolific_authors() -> SelectManager {
    let users = table("users");
    let posts = table("posts");
    SelectManager::new(&users)
        .project([users.attr("name"), count(posts.attr("id")).alias("posts")])
        .left_join(&posts)
        .on(posts.attr("author_id").eq(users.attr("id")))
        .group([users.attr("name")])
        .having(count_star().gt_eq(5))
}

fn new_comment() -> InsertManager {
    let comments = table("comments");
    InsertManager::new(&comments)
        .columns([comments.attr("post_id"), comments.attr("body")])
        .values([relsql_core::Node::from(1), relsql_core::Node::from("Nice post!")])
        .returning([comments.attr("id")])
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    for dialect in [Dialect::Postgres, Dialect::Mysql, Dialect::Sqlite] {
        let mut renderer = dialect.renderer(RenderOptions::default());
        let (sql, params) = published_posts().to_sql(&mut renderer)?;
        info!(dialect = dialect.name(), "published posts");
        println!("-- {}\n{sql}\n-- params: {params:?}\n", dialect.name());
    }

    let mut pretty = FormattedRenderer::new(PostgresRenderer::new());
    let (sql, _) = prolific_authors()
        .use_transformer(HideDeleted)
        .to_sql(&mut pretty)?;
    println!("-- prolific authors, soft-deleted rows hidden\n{sql}\n");

    let (sql, params) = new_comment().to_sql(&mut PostgresRenderer::new())?;
    println!("-- new comment\n{sql}\n-- params: {params:?}\n");

    let dot = published_posts().use_transformer(HideDeleted).to_graph()?;
    println!("-- AST of the published posts query\n{dot}");
    Ok(())
}
