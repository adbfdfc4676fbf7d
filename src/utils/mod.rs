pub mod distance;
pub mod geocoding;
pub mod init_map;
pub mod location_graph;
