pub(super) mod add;
pub(super) mod mv;
pub(super) mod remove;
pub(super) mod replace;
pub(super) mod show;
pub(super) mod update;
