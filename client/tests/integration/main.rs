mod actions;
mod permissions;
mod submit;
mod support;
