pub mod arcgis_hub;
pub mod arcgis_rest;
pub mod ckan;
pub mod custom_state_gis;
pub mod osm_overpass;
pub mod rdh;
pub mod socrata;
pub mod tiger_ftp;
