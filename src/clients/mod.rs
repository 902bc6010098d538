pub mod gbx_parser;
