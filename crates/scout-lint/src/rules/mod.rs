//! Built-in rules

mod no_code_duplication;
mod no_type_assertions;
mod no_unused_exports;
mod no_use_effect;
mod prefer_zod_validation;
mod prisma_client_disconnect;
mod require_structured_logging;

pub use no_code_duplication::NoCodeDuplication;
pub use no_type_assertions::NoTypeAssertions;
pub use no_unused_exports::NoUnusedExports;
pub use no_use_effect::NoUseEffect;
pub use prefer_zod_validation::PreferZodValidation;
pub use prisma_client_disconnect::PrismaClientDisconnect;
pub use require_structured_logging::RequireStructuredLogging;

use std::sync::Arc;

use crate::rule::Rule;
use crate::tools::{JscpdReport, KnipReport};

/// Rules that only need the file's AST
pub fn ast_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NoTypeAssertions),
        Arc::new(PreferZodValidation),
        Arc::new(NoUseEffect),
        Arc::new(PrismaClientDisconnect),
        Arc::new(RequireStructuredLogging),
    ]
}

/// Rules backed by whole-project knip and jscpd reports
pub fn tool_rules(
    project_root: String,
    knip: Arc<KnipReport>,
    jscpd: Arc<JscpdReport>,
) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NoUnusedExports::new(project_root.clone(), knip)),
        Arc::new(NoCodeDuplication::new(project_root, jscpd)),
    ]
}
