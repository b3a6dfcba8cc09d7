//! veridex-web — HTTP surface for the analysis pipeline.
//! Two routes: `POST /analyze` runs the pipeline, `GET /` reports health.

pub mod handlers;
pub mod router;
pub mod state;
