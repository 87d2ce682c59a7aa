pub mod badges;
pub mod countdown;
pub mod evaluator;
pub mod scoring;
