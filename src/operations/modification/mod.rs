mod detach_region;

pub use detach_region::DetachRegion;
