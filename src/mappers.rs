pub mod repository_mapper;
