//! The job orchestrator: drives one job through the fixed stage sequence,
//! persisting artifacts and journaling progress.
//!
//! Stage order: args saved → dataset loaded → training → trained →
//! evaluated → metadata saved → model persisted. Every journal entry is
//! written only after the artifact it announces, so a status line is never
//! a promise of an artifact that does not exist yet. A training failure is
//! journaled as a terminal event and aborts the pipeline; no downstream
//! artifact is produced.

use std::sync::Arc;

use tabforge_core::dataset::Dataset;
use tabforge_core::status::{
    JobState, StatusEvent, MSG_ARGS_SAVED, MSG_DATASET_IMPORTED, MSG_EVALUATION_DONE,
    MSG_METADATA_SAVED, MSG_MODEL_SAVED, MSG_MODEL_TRAINED, MSG_TRAINING_FAILED,
};
use tabforge_core::training::{ModelMetadata, SearchOptions, TrainingArgs};
use tabforge_store::{read_bin, write_bin, write_json, ArtifactKind, ArtifactStore, StatusJournal};

use crate::error::PipelineError;
use crate::evaluate::evaluate;
use crate::search::ModelSearch;

/// Runs jobs against an artifact store and a journal, delegating the
/// actual model search to the injected [`ModelSearch`].
pub struct Orchestrator {
    store: Arc<dyn ArtifactStore>,
    journal: Arc<StatusJournal>,
    search: Arc<dyn ModelSearch>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        journal: Arc<StatusJournal>,
        search: Arc<dyn ModelSearch>,
    ) -> Self {
        Self {
            store,
            journal,
            search,
        }
    }

    /// First stage, run synchronously on the request path: persist the
    /// training arguments, then announce them.
    pub async fn save_args(&self, args: &TrainingArgs) -> Result<(), PipelineError> {
        write_json(
            self.store.as_ref(),
            ArtifactKind::TrainingArgs,
            &args.token,
            args,
        )
        .await?;
        self.journal
            .append(
                &args.token,
                StatusEvent::ok(MSG_ARGS_SAVED),
                Some(JobState::ArgsSaved),
            )
            .await?;
        Ok(())
    }

    /// Remaining stages, run on a worker: dataset import through model
    /// persistence.
    pub async fn run(&self, args: TrainingArgs) -> Result<(), PipelineError> {
        let token = args.token.clone();
        tracing::info!(token, target = %args.target, iterations = args.iterations, "Pipeline started");

        // Dataset import.
        let dataset: Dataset =
            read_bin(self.store.as_ref(), ArtifactKind::Dataset, &token).await?;
        self.journal
            .append(
                &token,
                StatusEvent::ok(MSG_DATASET_IMPORTED),
                Some(JobState::Training),
            )
            .await?;

        // Model search on a blocking thread; the search is CPU-bound.
        // A panic inside the search surfaces as a join error and is
        // contained the same way as an ordinary search failure.
        let search = Arc::clone(&self.search);
        let fit_dataset = dataset.clone();
        let fit_args = args.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            search.fit(&fit_dataset, &fit_args, &SearchOptions::default())
        })
        .await;

        let model = match outcome {
            Ok(Ok(model)) => model,
            Ok(Err(e)) => return self.fail_training(&token, e.to_string()).await,
            Err(join_err) => {
                return self
                    .fail_training(&token, format!("model search panicked: {join_err}"))
                    .await
            }
        };
        self.journal
            .append(&token, StatusEvent::ok(MSG_MODEL_TRAINED), None)
            .await?;

        // Held-out evaluation.
        let results = evaluate(&model, &dataset, &args)?;
        write_json(
            self.store.as_ref(),
            ArtifactKind::Evaluation,
            &token,
            &results,
        )
        .await?;
        self.journal
            .append(
                &token,
                StatusEvent::ok(MSG_EVALUATION_DONE),
                Some(JobState::Evaluated),
            )
            .await?;

        // Metadata.
        let metadata = ModelMetadata {
            estimator: model.estimator.clone(),
            best_loss: model.best_loss,
            best_config: model.best_config.clone(),
        };
        write_json(
            self.store.as_ref(),
            ArtifactKind::Metadata,
            &token,
            &metadata,
        )
        .await?;
        self.journal
            .append(&token, StatusEvent::ok(MSG_METADATA_SAVED), None)
            .await?;

        // Model blob.
        write_bin(self.store.as_ref(), ArtifactKind::Model, &token, &model).await?;
        self.journal
            .append(
                &token,
                StatusEvent::ok(MSG_MODEL_SAVED),
                Some(JobState::Completed),
            )
            .await?;

        tracing::info!(token, estimator = %metadata.estimator, "Pipeline completed");
        Ok(())
    }

    /// Record a terminal training failure and abort.
    async fn fail_training(&self, token: &str, reason: String) -> Result<(), PipelineError> {
        tracing::error!(token, error = %reason, "Training failed");

        let mut extras = serde_json::Map::new();
        extras.insert("error".to_string(), serde_json::Value::String(reason.clone()));
        self.journal
            .append(
                token,
                StatusEvent::error(MSG_TRAINING_FAILED).with_extras(extras),
                Some(JobState::Failed),
            )
            .await?;

        Err(PipelineError::Training(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tabforge_core::dataset::Column;
    use tabforge_core::training::Task;
    use tabforge_store::{MemStore, StoreError};

    use crate::search::{BuiltinSearch, SearchError, TrainedModel};

    struct FailingSearch;

    impl ModelSearch for FailingSearch {
        fn fit(
            &self,
            _dataset: &Dataset,
            _args: &TrainingArgs,
            _options: &SearchOptions,
        ) -> Result<TrainedModel, SearchError> {
            Err(SearchError("estimator exploded".into()))
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            columns: vec![
                (
                    "x".into(),
                    Column::Float32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
                ),
                ("label".into(), Column::UInt32(vec![0, 0, 0, 0, 1, 1, 1, 1])),
            ],
        }
    }

    fn args() -> TrainingArgs {
        TrainingArgs {
            token: "job1".into(),
            target: "label".into(),
            task: Task::Classification,
            iterations: 15,
        }
    }

    fn orchestrator(search: Arc<dyn ModelSearch>) -> (Orchestrator, Arc<MemStore>) {
        let store = Arc::new(MemStore::new());
        let journal = Arc::new(StatusJournal::new(store.clone() as Arc<dyn ArtifactStore>));
        (
            Orchestrator::new(store.clone(), journal, search),
            store,
        )
    }

    async fn seed_dataset(store: &MemStore) {
        write_bin(store, ArtifactKind::Dataset, "job1", &dataset())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn successful_run_journals_stages_in_order() {
        let (orchestrator, store) = orchestrator(Arc::new(BuiltinSearch::new()));
        seed_dataset(&store).await;

        orchestrator.save_args(&args()).await.unwrap();
        orchestrator.run(args()).await.unwrap();

        let record = orchestrator.journal.read("job1").await.unwrap();
        let messages: Vec<&str> = record.events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                MSG_ARGS_SAVED,
                MSG_DATASET_IMPORTED,
                MSG_MODEL_TRAINED,
                MSG_EVALUATION_DONE,
                MSG_METADATA_SAVED,
                MSG_MODEL_SAVED,
            ]
        );
        assert_eq!(record.state, JobState::Completed);

        for kind in [
            ArtifactKind::TrainingArgs,
            ArtifactKind::Evaluation,
            ArtifactKind::Metadata,
            ArtifactKind::Model,
        ] {
            assert!(store.exists(kind, "job1").await, "missing {kind}");
        }
    }

    #[tokio::test]
    async fn training_failure_aborts_and_leaves_no_artifacts() {
        let (orchestrator, store) = orchestrator(Arc::new(FailingSearch));
        seed_dataset(&store).await;

        let err = orchestrator.run(args()).await.unwrap_err();
        assert_matches!(err, PipelineError::Training(_));

        let record = orchestrator.journal.read("job1").await.unwrap();
        assert_eq!(record.state, JobState::Failed);

        let last = record.events.last().unwrap();
        assert_eq!(last.message, MSG_TRAINING_FAILED);
        assert_eq!(last.flag, "error");
        assert_eq!(
            last.extras.as_ref().unwrap()["error"],
            serde_json::Value::String("estimator exploded".into())
        );

        for kind in [
            ArtifactKind::Evaluation,
            ArtifactKind::Metadata,
            ArtifactKind::Model,
        ] {
            assert!(!store.exists(kind, "job1").await, "unexpected {kind}");
        }
    }

    #[tokio::test]
    async fn panicking_search_is_contained_as_a_failure() {
        struct PanickingSearch;
        impl ModelSearch for PanickingSearch {
            fn fit(
                &self,
                _dataset: &Dataset,
                _args: &TrainingArgs,
                _options: &SearchOptions,
            ) -> Result<TrainedModel, SearchError> {
                panic!("boom");
            }
        }

        let (orchestrator, store) = orchestrator(Arc::new(PanickingSearch));
        seed_dataset(&store).await;

        assert_matches!(
            orchestrator.run(args()).await,
            Err(PipelineError::Training(_))
        );
        let record = orchestrator.journal.read("job1").await.unwrap();
        assert_eq!(record.state, JobState::Failed);
    }

    #[tokio::test]
    async fn missing_dataset_is_a_store_error() {
        let (orchestrator, _store) = orchestrator(Arc::new(BuiltinSearch::new()));
        let err = orchestrator.run(args()).await.unwrap_err();
        assert_matches!(
            err,
            PipelineError::Store(StoreError::NotFound {
                kind: ArtifactKind::Dataset,
                ..
            })
        );
    }
}
