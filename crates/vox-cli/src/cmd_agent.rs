use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::workspace::Workspace;

/// `vox agent serve`: expose the trip to a conversational agent over MCP
/// stdio. Edits the agent makes are auto-saved like any other.
pub fn serve(home: Option<&Path>) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;
    let Some(agent_id) = ws.settings.agent_id.clone() else {
        anyhow::bail!(
            "voice agent is not configured (set VOX_AGENT_ID or run `vox config set agent_id <id>`)"
        );
    };
    tracing::info!(agent_id = %agent_id, root = %ws.paths.root.display(), "starting agent server");

    let store = Arc::new(Mutex::new(ws.store));
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(vox_agent::serve(store, Some(agent_id)))
}
