mod triangulate_polygon;

pub use triangulate_polygon::TriangulatePolygon;
