use std::sync::{Arc, Mutex, MutexGuard};

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;

use vox_core::plan::{into_itinerary, DayPlan, PlannedStop};
use vox_core::{Coordinates, ItineraryStore, NewStop, StoryView};

/// Store handle shared between the agent server and its host.
pub type SharedStore = Arc<Mutex<ItineraryStore>>;

// --- Tool parameter structs ---

#[derive(Debug, Deserialize, JsonSchema)]
struct MoveMapParams {
    /// Latitude in degrees
    lat: f64,
    /// Longitude in degrees
    lng: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AddPlaceParams {
    /// Place name as the traveller would say it
    name: String,
    /// Latitude in degrees
    lat: f64,
    /// Longitude in degrees
    lng: f64,
    /// Day number to add the place to (default: 1)
    day: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PlanStopParams {
    name: String,
    lat: f64,
    lng: f64,
    /// What to do or see here
    notes: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PlanDayParams {
    /// Day number, starting at 1
    day: u32,
    /// One or two sentences describing the day
    narrative: Option<String>,
    stops: Vec<PlanStopParams>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SetItineraryParams {
    /// The whole trip, one entry per day. Replaces the current itinerary.
    days: Vec<PlanDayParams>,
}

impl From<PlanDayParams> for DayPlan {
    fn from(p: PlanDayParams) -> Self {
        DayPlan {
            day: p.day,
            narrative: p.narrative,
            stops: p
                .stops
                .into_iter()
                .map(|s| PlannedStop {
                    name: s.name,
                    lat: s.lat,
                    lng: s.lng,
                    notes: s.notes,
                })
                .collect(),
        }
    }
}

// --- MCP Server ---

/// MCP server that lets a conversational agent drive the itinerary.
#[derive(Clone)]
pub struct VoxAgentServer {
    store: SharedStore,
    agent_id: Option<String>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl VoxAgentServer {
    pub fn new(store: SharedStore, agent_id: Option<String>) -> Self {
        Self {
            store,
            agent_id,
            tool_router: Self::tool_router(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ItineraryStore>, McpError> {
        self.store
            .lock()
            .map_err(|_| McpError::internal_error("itinerary store lock poisoned", None))
    }

    /// Center the map on a point
    #[tool(description = "Move the map to the given latitude and longitude")]
    async fn move_map(
        &self,
        Parameters(params): Parameters<MoveMapParams>,
    ) -> Result<CallToolResult, McpError> {
        let at = Coordinates::new(params.lng, params.lat).map_err(invalid_params)?;
        self.lock()?.set_focused_location(at);
        Ok(CallToolResult::success(vec![Content::text("Map moved.")]))
    }

    /// Append one place to a day of the itinerary
    #[tool(description = "Add a place to the itinerary, optionally on a specific day")]
    async fn add_place(
        &self,
        Parameters(params): Parameters<AddPlaceParams>,
    ) -> Result<CallToolResult, McpError> {
        let at = Coordinates::new(params.lng, params.lat).map_err(invalid_params)?;
        let mut new = NewStop::new(params.name.clone(), at);
        new.day_index = params.day;
        let id = self.lock()?.add_stop(new);
        tracing::debug!(%id, name = %params.name, "agent added place");
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Added {} to itinerary.",
            params.name
        ))]))
    }

    /// Replace the whole itinerary with a day-by-day plan
    #[tool(
        description = "Replace the itinerary with a day-by-day plan. Each day has a number, an optional narrative, and ordered stops with name, lat, lng and optional notes."
    )]
    async fn set_itinerary(
        &self,
        Parameters(params): Parameters<SetItineraryParams>,
    ) -> Result<CallToolResult, McpError> {
        let plans: Vec<DayPlan> = params.days.into_iter().map(DayPlan::from).collect();
        let days = into_itinerary(plans).map_err(invalid_params)?;
        let mut store = self.lock()?;
        store.set_itinerary(days);
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Itinerary updated: {} days, {} stops.",
            store.itinerary().len(),
            store.stops().len()
        ))]))
    }

    /// Enter story mode at the first stop
    #[tool(description = "Start the story-mode journey at the first stop of the trip")]
    async fn start_journey(&self) -> Result<CallToolResult, McpError> {
        let mut store = self.lock()?;
        store.start_journey();
        let text = match describe_position(&store) {
            Some(at) => format!("Journey started. {at}"),
            None => "Itinerary is empty.".to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Advance the story-mode cursor
    #[tool(description = "Go to the next stop of the journey")]
    async fn next_stop(&self) -> Result<CallToolResult, McpError> {
        let mut store = self.lock()?;
        let moved = store.next_stop();
        Ok(CallToolResult::success(vec![Content::text(step_message(
            &store,
            moved,
            "Already at the last stop.",
        ))]))
    }

    /// Move the story-mode cursor back
    #[tool(description = "Go back to the previous stop of the journey")]
    async fn prev_stop(&self) -> Result<CallToolResult, McpError> {
        let mut store = self.lock()?;
        let moved = store.prev_stop();
        Ok(CallToolResult::success(vec![Content::text(step_message(
            &store,
            moved,
            "Already at the first stop.",
        ))]))
    }

    /// Leave story mode
    #[tool(description = "Stop the journey and leave story mode")]
    async fn stop_journey(&self) -> Result<CallToolResult, McpError> {
        self.lock()?.stop_journey();
        Ok(CallToolResult::success(vec![Content::text(
            "Journey stopped.",
        )]))
    }
}

#[tool_handler]
impl ServerHandler for VoxAgentServer {
    fn get_info(&self) -> ServerInfo {
        let mut instructions =
            "Vox Travel trip planner: move the map, add places, plan days, and narrate the journey stop by stop"
                .to_string();
        if let Some(id) = &self.agent_id {
            instructions.push_str(&format!(" (agent {id})"));
        }
        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _req: Option<PaginatedRequestParams>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut itinerary = RawResource::new("vox://itinerary", "Itinerary");
        itinerary.description = Some("Day-grouped stops of the current trip".into());
        itinerary.mime_type = Some("application/json".into());

        let mut constraints = RawResource::new("vox://constraints", "Trip Constraints");
        constraints.description = Some("Destination, duration and vibe of the trip".into());
        constraints.mime_type = Some("application/json".into());

        Ok(ListResourcesResult {
            resources: vec![itinerary.no_annotation(), constraints.no_annotation()],
            ..Default::default()
        })
    }

    async fn read_resource(
        &self,
        req: ReadResourceRequestParams,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let store = self.lock()?;
        let rendered = match req.uri.as_str() {
            "vox://itinerary" => serde_json::to_string_pretty(store.itinerary()),
            "vox://constraints" => serde_json::to_string_pretty(&store.state().trip_constraints),
            _ => {
                return Err(McpError::resource_not_found(
                    format!("Unknown resource: {}", req.uri),
                    None,
                ))
            }
        };
        drop(store);
        let text = rendered.map_err(to_mcp_err)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, &req.uri)],
        })
    }
}

/// "At {name} (Day n, stop m)." for the active stop, if any.
fn describe_position(store: &ItineraryStore) -> Option<String> {
    match store.story_view() {
        StoryView::Stop(frame) => Some(format!(
            "At {} (Day {}, stop {}).",
            frame.stop.name,
            frame.day.day,
            frame.activity_index + 1
        )),
        StoryView::Inactive | StoryView::Empty => None,
    }
}

fn step_message(store: &ItineraryStore, moved: bool, boundary: &str) -> String {
    if !store.cursor().is_active() {
        return "Story mode is off. Start the journey first.".to_string();
    }
    match (moved, describe_position(store)) {
        (_, None) => "Itinerary is empty.".to_string(),
        (true, Some(at)) => at,
        (false, Some(at)) => format!("{boundary} {at}"),
    }
}

fn to_mcp_err(e: impl std::fmt::Display) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

fn invalid_params(e: impl std::fmt::Display) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

/// Start the MCP server on stdio transport.
pub async fn serve(store: SharedStore, agent_id: Option<String>) -> anyhow::Result<()> {
    if agent_id.is_none() {
        anyhow::bail!(
            "voice agent is not configured (set VOX_AGENT_ID or run `vox config set agent_id <id>`)"
        );
    }
    let server = VoxAgentServer::new(store, agent_id);
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
