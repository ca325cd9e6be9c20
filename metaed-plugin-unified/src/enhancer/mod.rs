mod merge_directive;

pub use merge_directive::MergeDirectiveEnhancer;
