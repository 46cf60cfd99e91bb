use hp_results::CaseStatus;

use crate::sweep::SweepAxis;

#[derive(Debug, Clone, PartialEq)]
pub enum StudyStage {
    LoadingStudy,
    CheckingCache,
    LoadingCachedResult,
    SolvingDesign,
    Sweeping { axis: SweepAxis },
    Replaying,
    SavingResults,
    Completed,
}

impl StudyStage {
    pub fn label(&self) -> &'static str {
        match self {
            StudyStage::LoadingStudy => "loading",
            StudyStage::CheckingCache => "cache",
            StudyStage::LoadingCachedResult => "cached",
            StudyStage::SolvingDesign => "design",
            StudyStage::Sweeping { axis } => axis.as_str(),
            StudyStage::Replaying => "replay",
            StudyStage::SavingResults => "saving",
            StudyStage::Completed => "done",
        }
    }
}

/// One finished case inside a sweep or replay.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseProgress {
    pub index: usize,
    /// Unknown for lazily read datasets.
    pub total: Option<usize>,
    pub status: CaseStatus,
}

#[derive(Debug, Clone)]
pub struct StudyProgressEvent {
    pub stage: StudyStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub case: Option<CaseProgress>,
}

impl StudyProgressEvent {
    pub fn stage(stage: StudyStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            case: None,
        }
    }
}
