pub mod notify_query;
pub mod notify_response;
pub mod notify_route;
