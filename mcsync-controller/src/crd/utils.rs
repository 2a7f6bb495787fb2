// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use kube::CustomResourceExt;

use crate::crd::v1alpha1::subscription::Subscription;
use crate::error::{ControllerError, Result};


/// Render the CRDs for the controller as a multi-document YAML stream
pub fn generate_crds() -> Result<String> {
    let mut out = String::new();
    for crd in [Subscription::crd()] {
        out.push_str("---\n");
        out.push_str(
            &serde_norway::to_string(&crd)
                .map_err(|e| ControllerError::CrdRenderError(e.to_string()))?
        );
    }
    Ok(out)
}
