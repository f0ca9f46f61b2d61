pub mod domain;
pub mod ports;
pub mod text;

pub use domain::{
    AuthSession, DocumentKind, ExtractedText, Highlights, HistoryRecord, NewHistoryRecord,
    SummaryOptions, SummaryResult, SummaryType, Tone, User, UserCredentials,
};
pub use ports::{
    DatabaseService, HighlightExtractionService, PortError, PortResult, SummarizationService,
    TextExtractionService,
};
