//! Ready-made pipelines for the two reference datasets
//!
//! Each call returns a fresh, unfitted pipeline.

use super::Pipeline;
use crate::error::Result;
use crate::transform::{
    DropColumnsTransformer, Fence, MappingTransformer, OneHotTransformer, TukeyTransformer,
};

/// Titanic passengers: encode gender and class, expand the boarding port,
/// clip fares to the outer fence.
pub fn titanic_transformer() -> Result<Pipeline> {
    Pipeline::new()
        .with_stage(
            "gender",
            MappingTransformer::new("Gender", [("Male", 0i64), ("Female", 1)]),
        )?
        .with_stage(
            "class",
            MappingTransformer::new("Class", [("Crew", 0i64), ("C3", 1), ("C2", 2), ("C1", 3)]),
        )?
        .with_stage("joined_ohe", OneHotTransformer::new("Joined"))?
        .with_stage("fare", TukeyTransformer::new("Fare", Fence::Outer))
}

pub fn customer_transformer() -> Result<Pipeline> {
    Pipeline::new()
        .with_stage("drop_columns", DropColumnsTransformer::drop(["ID"]))?
        .with_stage(
            "gender",
            MappingTransformer::new("Gender", [("Male", 0i64), ("Female", 1)]),
        )?
        .with_stage(
            "experience_level",
            MappingTransformer::new(
                "Experience Level",
                [("low", 0i64), ("medium", 1), ("high", 2)],
            ),
        )?
        .with_stage("os", OneHotTransformer::new("OS"))?
        .with_stage("isp", OneHotTransformer::new("ISP"))?
        .with_stage("time spent", TukeyTransformer::new("Time Spent", Fence::Inner))
}

/// Look up a preset by name (`titanic` or `customer`)
pub fn preset(name: &str) -> Result<Pipeline> {
    match name.to_lowercase().as_str() {
        "titanic" => titanic_transformer(),
        "customer" => customer_transformer(),
        _ => Err(crate::error::PrepError::argument(format!(
            "unknown preset '{}', expected 'titanic' or 'customer'",
            name
        ))),
    }
}
