pub mod add;
pub mod area;
pub mod auth;
pub mod block;
pub mod calendar;
pub mod delete;
pub mod r#do;
pub mod edit;
pub mod list;
pub mod project;
pub mod recur;
pub mod show;
pub mod subtask;
pub mod suggest;
