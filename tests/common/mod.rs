#![allow(dead_code)]

pub(crate) mod exam;

pub(crate) mod lasso_semantics;

pub(crate) mod logging;
