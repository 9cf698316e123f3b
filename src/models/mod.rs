pub mod batch;
pub mod category;
pub mod classification;
pub mod label;

pub use batch::{BatchComment, BatchRequest, BatchResponse, BatchStats, CommentVerdict};
pub use category::{Category, EmotionCategory, SentimentCategory};
pub use classification::{
    CategoryScore, ClassificationDetail, ClassificationResult, Correction, LabelScore,
    RankedCategoryList, RawSummary,
};
pub use label::{RawLabel, RawProbabilityVector, RAW_LABEL_COUNT};
