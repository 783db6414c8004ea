// src/pipeline.rs
// =============================================================================
// Runs collect -> generate for one repository.
//
// Stages:
//
//   Idle -> Collecting -> Generating -> Done
//                |             |
//                +-> Failed <--+
//
// A Pipeline is consumed by `run`, so each one produces exactly one Outcome.
// The first error ends the run; there is no partial README.
// =============================================================================

use serde::Serialize;
use tracing::{error, info};

use crate::error::PipelineError;
use crate::generate::{generate_readme, TextGenerator};
use crate::github::{collect, flatten, RepoId, RepositorySource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Collecting,
    Generating,
    Done,
    Failed,
}

impl Stage {
    /// Whether `self -> next` is an edge of the stage graph.
    pub fn can_advance_to(self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Idle, Stage::Collecting)
                | (Stage::Collecting, Stage::Generating)
                | (Stage::Collecting, Stage::Failed)
                | (Stage::Generating, Stage::Done)
                | (Stage::Generating, Stage::Failed)
        )
    }
}

/// A successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub repo: RepoId,
    pub files: usize,
    pub aggregate_bytes: usize,
    pub readme: String,
}

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    Done(Report),
    Failed {
        /// The stage that was running when the error happened.
        stage: Stage,
        error: PipelineError,
    },
}

pub struct Pipeline<'a, S: ?Sized, G: ?Sized> {
    source: &'a S,
    generator: &'a G,
    stage: Stage,
}

impl<'a, S, G> Pipeline<'a, S, G>
where
    S: RepositorySource + ?Sized,
    G: TextGenerator + ?Sized,
{
    pub fn new(source: &'a S, generator: &'a G) -> Self {
        Self {
            source,
            generator,
            stage: Stage::Idle,
        }
    }

    pub async fn run(mut self, repo: &RepoId) -> Outcome {
        self.advance(Stage::Collecting);
        let files = match collect(self.source, repo).await {
            Ok(files) => files,
            Err(e) => return self.fail(e.into()),
        };
        let aggregate = flatten(&files);

        self.advance(Stage::Generating);
        let readme = match generate_readme(self.generator, &aggregate).await {
            Ok(readme) => readme,
            Err(e) => return self.fail(e.into()),
        };

        self.advance(Stage::Done);
        Outcome::Done(Report {
            repo: repo.clone(),
            files: files.len(),
            aggregate_bytes: aggregate.len(),
            readme,
        })
    }

    /// Moves to `next` if the stage graph allows it; otherwise the stage is
    /// left untouched and `false` is returned.
    fn advance(&mut self, next: Stage) -> bool {
        if !self.stage.can_advance_to(next) {
            error!(from = ?self.stage, to = ?next, "illegal stage transition rejected");
            return false;
        }
        info!(from = ?self.stage, to = ?next, "pipeline stage");
        self.stage = next;
        true
    }

    fn fail(mut self, error: PipelineError) -> Outcome {
        let stage = self.stage;
        error!(stage = ?stage, error = %error, "pipeline failed");
        self.advance(Stage::Failed);
        Outcome::Failed { stage, error }
    }
}
