// Résumé-to-job matching engine.
// Flow: prompts → llm_client (ModelInvoker) → parser → analyzer → batch ranking.
// All model calls go through llm_client.

pub mod analyzer;
pub mod batch;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
