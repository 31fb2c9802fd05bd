/// Index handles into the vectors owned by `Scene`.
///
/// Handles are only handed out by `SceneBuilder`, so a handle from one scene
/// is always in range for that scene.
macro_rules! scene_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

scene_id!(
    /// A submesh of the scene geometry.
    MeshId
);
scene_id!(
    /// A material; also its slot in the material constant buffer.
    MaterialId
);
scene_id!(
    /// A render item; also its slot in the object constant buffer.
    ItemId
);
