use server_api::DispatchContext;

/// Immutable for the life of the process; requests share it read-only.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) dispatch: DispatchContext,
}
