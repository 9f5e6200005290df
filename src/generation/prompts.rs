// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed instruction templates for the generation strategies
//!
//! These are static policy text, never user input. Nothing from the upload
//! (filename, metadata, declared type) is interpolated into a prompt.

/// Instruction for the analysis step: describe the subject only
pub const ANALYSIS_PROMPT: &str = "Analyze the provided image. Describe the MAIN person in the picture in extreme detail, \
    focusing on their physical appearance, clothing, hair, pose, and facial expression. \
    Do not describe the background. Output ONLY the visual description.";

/// Instruction for the single-call edit strategy
pub const EDIT_PROMPT: &str = "Transform the main person in this photo into a high-quality 3D cartoon style character. \
    Place the character on a pure white background with soft professional studio lighting. \
    Pixar-style 3D rendering, cute, expressive, clean lines, pastel colors.";

/// Build the image-generation prompt from the analysis step's description
pub fn generation_prompt(description: &str) -> String {
    format!(
        "A high-quality 3D cartoon style character of {}. \
         The character should be on a pure white background. \
         Soft professional studio lighting. \
         Pixar-style 3D rendering, cute, expressive, clean lines, pastel colors.",
        description.trim()
    )
}
