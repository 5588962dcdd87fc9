//! Core plugin: shared resources and global settings.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::common::waves::WaveTable;

pub fn plugin(app: &mut App) {
    app.insert_resource(Tunables::default());
    app.insert_resource(WaveTable::default());
    app.insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.05)));
}
