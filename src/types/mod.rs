pub mod dto;

pub use dto::{
    ColumnDescriptor, ErrorBody, HealthResponse, Language, QueryRequest, QueryResult, Row,
    SchemaDescriptor, SchemaResponse,
};
