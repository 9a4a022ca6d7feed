// PageGate - Page Manifest
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// The single discovery point. Every page area registers explicitly, so
// the whole definition set is known before the first navigation resolves
// and a bad entry fails at boot (and in the tests below), not at dispatch.

use crate::admin_pages;
use crate::auth_pages;
use crate::route::PageDefinition;
use crate::shared_pages;
use crate::student_pages;
use crate::teacher_pages;

/// Every page definition in the portal, registration order.
/// Order matters: it is the matcher's documented tie-break.
pub fn page_definitions() -> Vec<PageDefinition> {
    let mut defs = Vec::new();
    defs.extend(auth_pages::definitions());
    defs.extend(shared_pages::definitions());
    defs.extend(student_pages::definitions());
    defs.extend(teacher_pages::definitions());
    defs.extend(admin_pages::definitions());
    defs
}

// ============================================================================
// TESTS
// ============================================================================
