use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_core::{
    cosine_similarity, normalize_title, Article, ArticleStatus, ArticleStorage, Error,
    NewArticle, Result, ScoredArticle, TextQuery,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::search::relevance;
use crate::{BackendConfig, StorageBackend};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL UNIQUE COLLATE NOCASE,
        slug TEXT NOT NULL UNIQUE,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        subcategory TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published', 'archived')),
        word_count INTEGER NOT NULL DEFAULT 0,
        similarity_score REAL NOT NULL DEFAULT 0,
        embedding TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_category ON articles (category, subcategory)",
    "CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles (created_at DESC)",
];

const COLUMNS: &str =
    "id, title, slug, content, category, subcategory, status, word_count, similarity_score, created_at, updated_at";

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

fn db_error(context: &str, e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return Error::Duplicate(format!("{}: {}", context, db.message()));
        }
    }
    Error::Storage(format!("{}: {}", context, e))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date: {}", e)))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let id: String = row.get("id");
    let status: String = row.get("status");
    let word_count: i64 = row.get("word_count");
    Ok(Article {
        id: Uuid::parse_str(&id).map_err(|e| Error::Storage(format!("Invalid id {}: {}", id, e)))?,
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
        status: status.parse()?,
        word_count: word_count.max(0) as usize,
        similarity_score: row.get("similarity_score"),
        created_at: parse_time(&row.get::<String, _>("created_at"))?,
        updated_at: parse_time(&row.get::<String, _>("updated_at"))?,
    })
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn kind() -> &'static str {
        "sqlite"
    }

    async fn connect(config: &BackendConfig) -> Result<Self> {
        let path = config
            .url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        Self::new_with_path(Path::new(path)).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Article>> {
        let sql = format!("SELECT {} FROM articles WHERE {} LIMIT 1", COLUMNS, clause);
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to query articles", e))?;
        row.as_ref().map(row_to_article).transpose()
    }

    async fn require(&self, id: Uuid) -> Result<Article> {
        self.get_article(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Blog post with ID {}", id)))
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        let article = Article::from_new(article, Utc::now());
        sqlx::query(
            r#"
            INSERT INTO articles
            (id, title, slug, content, category, subcategory, status, word_count, similarity_score, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(&article.category)
        .bind(&article.subcategory)
        .bind(article.status.as_str())
        .bind(article.word_count as i64)
        .bind(article.similarity_score)
        .bind(article.created_at.to_rfc3339())
        .bind(article.updated_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to store article", e))?;

        Ok(article)
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
        self.fetch_one_where("id = ?", &id.to_string()).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        self.fetch_one_where("slug = ?", slug).await
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        let sql = format!("SELECT {} FROM articles ORDER BY created_at DESC", COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to list articles", e))?;
        rows.iter().map(row_to_article).collect()
    }

    async fn normalized_titles(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT title FROM articles")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to load titles", e))?;
        Ok(rows
            .iter()
            .map(|row| normalize_title(&row.get::<String, _>("title")))
            .collect())
    }

    async fn find_title_containing(&self, needle: &str) -> Result<Option<Article>> {
        self.fetch_one_where("instr(lower(title), ?) > 0", &needle.to_lowercase())
            .await
    }

    async fn find_slug_containing(&self, needle: &str) -> Result<Option<Article>> {
        self.fetch_one_where("instr(lower(slug), ?) > 0", &needle.to_lowercase())
            .await
    }

    async fn text_search(&self, query: &TextQuery, limit: usize) -> Result<Vec<ScoredArticle>> {
        let mut scored: Vec<ScoredArticle> = self
            .list_articles()
            .await?
            .into_iter()
            .map(|article| ScoredArticle {
                score: relevance(query, &article.title, &article.content),
                article,
            })
            .filter(|s| s.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn nearest_by_embedding(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredArticle>> {
        let sql = format!(
            "SELECT {}, embedding FROM articles WHERE embedding IS NOT NULL",
            COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to load embeddings", e))?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in &rows {
            let stored: Vec<f32> = serde_json::from_str(&row.get::<String, _>("embedding"))?;
            scored.push(ScoredArticle {
                score: cosine_similarity(embedding, &stored) as f64,
                article: row_to_article(row)?,
            });
        }
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn set_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<()> {
        let result = sqlx::query("UPDATE articles SET embedding = ? WHERE id = ?")
            .bind(serde_json::to_string(embedding)?)
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to store embedding", e))?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Blog post with ID {}", id)));
        }
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ArticleStatus) -> Result<Article> {
        sqlx::query("UPDATE articles SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to update status", e))?;
        self.require(id).await
    }

    async fn update_slug(&self, id: Uuid, slug: &str) -> Result<Article> {
        sqlx::query("UPDATE articles SET slug = ?, updated_at = ? WHERE id = ?")
            .bind(slug)
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to update slug", e))?;
        self.require(id).await
    }

    async fn publish_all_drafts(&self) -> Result<u64> {
        let result = sqlx::query("UPDATE articles SET status = 'published', updated_at = ? WHERE status = 'draft'")
            .bind(Utc::now().to_rfc3339())
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to publish drafts", e))?;
        Ok(result.rows_affected())
    }

    async fn count_by_status(&self) -> Result<Vec<(ArticleStatus, u64)>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM articles GROUP BY status")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to count articles", e))?;
        let mut counts: Vec<(ArticleStatus, u64)> = ArticleStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for row in rows {
            let status: ArticleStatus = row.get::<String, _>("status").parse()?;
            let n: i64 = row.get("n");
            if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status) {
                entry.1 = n as u64;
            }
        }
        Ok(counts)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT category FROM articles ORDER BY category")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to list categories", e))?;
        Ok(rows.iter().map(|row| row.get("category")).collect())
    }

    async fn subcategories(&self, category: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT subcategory FROM articles WHERE category = ? ORDER BY subcategory",
        )
        .bind(category)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to list subcategories", e))?;
        Ok(rows.iter().map(|row| row.get("subcategory")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_article(title: &str, slug: &str) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            slug: slug.to_string(),
            content: "Sourdough needs patience and a lively starter.".to_string(),
            category: "Food".to_string(),
            subcategory: "Baking".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();

        let saved = storage.insert_article(new_article("Bread Basics", "bread-basics")).await.unwrap();
        assert_eq!(saved.word_count, 7);

        let loaded = storage.get_by_slug("bread-basics").await.unwrap().unwrap();
        assert_eq!(loaded.id, saved.id);
        assert_eq!(storage.normalized_titles().await.unwrap(), vec!["bread basics"]);
        assert!(storage.find_title_containing("BREAD").await.unwrap().is_some());

        let dup = storage.insert_article(new_article("Bread Basics", "another")).await;
        assert!(matches!(dup, Err(Error::Duplicate(_))));
        let dup_case = storage.insert_article(new_article("BREAD basics", "shouting")).await;
        assert!(matches!(dup_case, Err(Error::Duplicate(_))));

        let query = TextQuery::new(["Sourdough needs patience and a lively starter"]);
        let hits = storage.text_search(&query, 1).await.unwrap();
        assert_eq!(hits[0].article.id, saved.id);

        storage.set_embedding(saved.id, &[1.0, 0.0]).await.unwrap();
        let nearest = storage.nearest_by_embedding(&[1.0, 0.0], 1).await.unwrap();
        assert!((nearest[0].score - 1.0).abs() < 1e-6);

        assert_eq!(storage.publish_all_drafts().await.unwrap(), 1);
        let archived = storage.update_status(saved.id, ArticleStatus::Archived).await.unwrap();
        assert_eq!(archived.status, ArticleStatus::Archived);
        assert!(storage.update_status(Uuid::new_v4(), ArticleStatus::Draft).await.unwrap_err().is_not_found());
    }
}
