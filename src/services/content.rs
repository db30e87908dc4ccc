// src/services/content.rs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
    time::Duration,
};

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;

use crate::{
    models::{
        lesson::LessonContent,
        question::{Question, QuestionSet},
    },
    utils::cache::TtlCache,
};

static MODULE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid module id pattern"));

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid module id '{0}'")]
    InvalidModuleId(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed question file {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Blob storage for lesson bodies and test question sets.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// `Ok(None)` when the lesson does not exist.
    async fn lesson(
        &self,
        module_id: &str,
        lesson_number: i64,
    ) -> Result<Option<LessonContent>, ContentError>;

    /// `Ok(None)` when the module has no test.
    async fn questions(&self, module_id: &str) -> Result<Option<Vec<Question>>, ContentError>;
}

/// Filesystem store rooted at one directory:
///
/// ```text
/// <root>/lessons/<module_id>/lesson_<NN>.md
/// <root>/tests/<module_id>/test_questions.json
/// ```
pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn lesson_path(&self, module_id: &str, lesson_number: i64) -> PathBuf {
        self.root
            .join("lessons")
            .join(module_id)
            .join(format!("lesson_{:02}.md", lesson_number))
    }

    pub fn questions_path(&self, module_id: &str) -> PathBuf {
        self.root
            .join("tests")
            .join(module_id)
            .join("test_questions.json")
    }
}

fn checked_module_id(module_id: &str) -> Result<&str, ContentError> {
    if MODULE_ID.is_match(module_id) {
        Ok(module_id)
    } else {
        Err(ContentError::InvalidModuleId(module_id.to_string()))
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>, ContentError> {
    match tokio::fs::read_to_string(path).await {
        Ok(body) => Ok(Some(body)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ContentError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn lesson(
        &self,
        module_id: &str,
        lesson_number: i64,
    ) -> Result<Option<LessonContent>, ContentError> {
        let module_id = checked_module_id(module_id)?;
        let body = read_optional(&self.lesson_path(module_id, lesson_number)).await?;

        Ok(body.map(|content| LessonContent {
            module_id: module_id.to_string(),
            lesson_number,
            content,
            content_type: "markdown".to_string(),
        }))
    }

    async fn questions(&self, module_id: &str) -> Result<Option<Vec<Question>>, ContentError> {
        let module_id = checked_module_id(module_id)?;
        let path = self.questions_path(module_id);

        let Some(raw) = read_optional(&path).await? else {
            return Ok(None);
        };

        let set: QuestionSet =
            serde_json::from_str(&raw).map_err(|source| ContentError::Malformed { path, source })?;
        Ok(Some(set.questions))
    }
}

/// Content access for handlers: a `ContentStore` behind read-through caches.
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    lessons: TtlCache<LessonContent>,
    questions: TtlCache<Arc<Vec<Question>>>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, ttl: Duration) -> Self {
        Self {
            store,
            lessons: TtlCache::new(ttl),
            questions: TtlCache::new(ttl),
        }
    }

    pub async fn lesson(
        &self,
        module_id: &str,
        lesson_number: i64,
    ) -> Result<Option<LessonContent>, ContentError> {
        let key = format!("lesson:{}:{}", module_id, lesson_number);
        self.lessons
            .get_or_load(&key, || self.store.lesson(module_id, lesson_number))
            .await
    }

    /// Full question set including correct answers. Server-side use only.
    pub async fn questions(
        &self,
        module_id: &str,
    ) -> Result<Option<Arc<Vec<Question>>>, ContentError> {
        let key = format!("test_questions:{}", module_id);
        self.questions
            .get_or_load(&key, || async {
                Ok(self.store.questions(module_id).await?.map(Arc::new))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        reads: AtomicUsize,
    }

    #[async_trait]
    impl ContentStore for CountingStore {
        async fn lesson(
            &self,
            module_id: &str,
            lesson_number: i64,
        ) -> Result<Option<LessonContent>, ContentError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if lesson_number > 2 {
                return Ok(None);
            }
            Ok(Some(LessonContent {
                module_id: module_id.to_string(),
                lesson_number,
                content: format!("# Lesson {}", lesson_number),
                content_type: "markdown".to_string(),
            }))
        }

        async fn questions(&self, _module_id: &str) -> Result<Option<Vec<Question>>, ContentError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Vec::new()))
        }
    }

    #[tokio::test]
    async fn repeated_reads_hit_the_cache() {
        let store = Arc::new(CountingStore {
            reads: AtomicUsize::new(0),
        });
        let service = ContentService::new(store.clone(), Duration::from_secs(3600));

        for _ in 0..3 {
            let lesson = service.lesson("Module_01", 1).await.unwrap();
            assert_eq!(lesson.unwrap().content, "# Lesson 1");
        }
        service.questions("Module_01").await.unwrap();
        service.questions("Module_01").await.unwrap();

        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_lessons_are_reread() {
        let store = Arc::new(CountingStore {
            reads: AtomicUsize::new(0),
        });
        let service = ContentService::new(store.clone(), Duration::from_secs(3600));

        assert!(service.lesson("Module_01", 5).await.unwrap().is_none());
        assert!(service.lesson("Module_01", 5).await.unwrap().is_none());
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn local_store_rejects_path_traversal() {
        let store = LocalContentStore::new(std::env::temp_dir());
        let err = store.lesson("../etc", 1).await.unwrap_err();
        assert!(matches!(err, ContentError::InvalidModuleId(_)));
    }

    #[tokio::test]
    async fn local_store_reads_canonical_layout() {
        let root = std::env::temp_dir().join(format!("content_{}", uuid::Uuid::new_v4()));
        let store = LocalContentStore::new(&root);

        std::fs::create_dir_all(root.join("lessons/Module_01")).unwrap();
        std::fs::write(store.lesson_path("Module_01", 1), "Hello").unwrap();
        std::fs::create_dir_all(root.join("tests/Module_01")).unwrap();
        std::fs::write(
            store.questions_path("Module_01"),
            r#"{"questions": [{"question_id": "q1", "question": "2+2?", "correct_answer": "4"}]}"#,
        )
        .unwrap();

        let lesson = store.lesson("Module_01", 1).await.unwrap().unwrap();
        assert_eq!(lesson.content, "Hello");
        assert!(store.lesson("Module_01", 2).await.unwrap().is_none());

        let questions = store.questions("Module_01").await.unwrap().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_id, "q1");
        assert!(store.questions("Module_02").await.unwrap().is_none());

        std::fs::remove_dir_all(root).ok();
    }
}
