//! Save and restore of one CIA as a single `CIA6` chunk.

use emu_core::snapshot::{ChunkReader, ChunkWriter, Tag};
use emu_core::{SnapshotError, SnapshotReader, SnapshotWriter, VideoStandard};
use log::warn;

use crate::icr::InterruptControl;
use crate::timer::{Half, Timer};
use crate::tod::Time;
use crate::{Cia6526, Port};

pub const SNAPSHOT_TAG: Tag = *b"CIA6";
pub const SNAPSHOT_VERSION: u8 = 1;

fn put_port(c: &mut ChunkWriter, port: &Port) {
    c.put_u8(port.output);
    c.put_u8(port.ddr);
    c.put_u8(port.input);
}

fn get_port(c: &mut ChunkReader<'_>) -> Result<Port, SnapshotError> {
    Ok(Port {
        output: c.get_u8()?,
        ddr: c.get_u8()?,
        input: c.get_u8()?,
    })
}

fn put_timer(c: &mut ChunkWriter, timer: &Timer) {
    c.put_u16(timer.latch);
    c.put_u16(timer.counter);
    c.put_u8(timer.control);
    let (half, frozen) = match timer.snapshot {
        None => (0, 0),
        Some((Half::Low, v)) => (1, v),
        Some((Half::High, v)) => (2, v),
    };
    c.put_u8(half);
    c.put_u16(frozen);
}

fn get_timer(c: &mut ChunkReader<'_>, timer: &mut Timer) -> Result<(), SnapshotError> {
    timer.latch = c.get_u16()?;
    timer.counter = c.get_u16()?;
    timer.control = c.get_u8()? & !crate::control::FORCE_LOAD;
    let half = c.get_u8()?;
    let frozen = c.get_u16()?;
    timer.snapshot = match half {
        0 => None,
        1 => Some((Half::Low, frozen)),
        2 => Some((Half::High, frozen)),
        other => return Err(c.invalid("timer read latch", u64::from(other))),
    };
    Ok(())
}

fn put_time(c: &mut ChunkWriter, time: &Time) {
    c.put_bytes(&time.fields());
}

fn get_time(c: &mut ChunkReader<'_>, field: &'static str) -> Result<Time, SnapshotError> {
    let fields = c.get_bytes::<4>()?;
    let time = Time::from_fields(fields);
    if !time.is_valid() {
        return Err(c.invalid(field, u64::from(u32::from_le_bytes(fields))));
    }
    Ok(time)
}

impl Cia6526 {
    pub fn save_state(&self, out: &mut SnapshotWriter) {
        out.chunk(SNAPSHOT_TAG, SNAPSHOT_VERSION, |c| {
            c.put_u8(self.video.to_byte());
            put_port(c, &self.port_a);
            put_port(c, &self.port_b);
            put_timer(c, &self.timer_a);
            put_timer(c, &self.timer_b);

            put_time(c, &self.tod.time);
            put_time(c, &self.tod.alarm);
            c.put_bool(self.tod.latch.is_some());
            put_time(c, &self.tod.latch.unwrap_or_default());
            c.put_bool(self.tod.halted);
            c.put_bool(self.tod.matched);
            c.put_u64(self.tod.accumulator);

            c.put_u8(self.serial.data);
            c.put_u8(self.serial.shift);
            c.put_u8(self.serial.bits);
            c.put_bool(self.serial.half);
            c.put_bool(self.serial.shifting);
            c.put_bool(self.serial.pending);
            c.put_bool(self.serial.output);
            c.put_bool(self.serial.sp_in);

            c.put_u8(self.icr.pending().bits());
            c.put_u8(self.icr.mask().bits());
            c.put_bool(self.cnt);
            c.put_bool(self.flag);
            for level in self.pb_toggle.into_iter().chain(self.pb_pulse) {
                c.put_bool(level);
            }
        });
    }

    /// Decode a chunk into a copy of this chip. `self` is not touched.
    fn decode(&self, input: &mut SnapshotReader<'_>) -> Result<Self, SnapshotError> {
        let mut c = input.read_chunk(SNAPSHOT_TAG, SNAPSHOT_VERSION)?;
        let mut next = self.clone();

        let video_byte = c.get_u8()?;
        let video = VideoStandard::from_byte(video_byte)
            .ok_or_else(|| c.invalid("video standard", u64::from(video_byte)))?;
        next.set_video_standard(video);
        next.port_a = get_port(&mut c)?;
        next.port_b = get_port(&mut c)?;
        get_timer(&mut c, &mut next.timer_a)?;
        get_timer(&mut c, &mut next.timer_b)?;

        next.tod.time = get_time(&mut c, "tod time")?;
        next.tod.alarm = get_time(&mut c, "tod alarm")?;
        let latched = c.get_bool("tod latched")?;
        let latch = get_time(&mut c, "tod latch")?;
        next.tod.latch = latched.then_some(latch);
        next.tod.halted = c.get_bool("tod halted")?;
        next.tod.matched = c.get_bool("tod matched")?;
        let accumulator = c.get_u64()?;
        if accumulator >= next.tod.threshold {
            return Err(c.invalid("tod accumulator", accumulator));
        }
        next.tod.accumulator = accumulator;

        next.serial.data = c.get_u8()?;
        next.serial.shift = c.get_u8()?;
        let bits = c.get_u8()?;
        if bits >= 8 {
            return Err(c.invalid("serial bit count", u64::from(bits)));
        }
        next.serial.bits = bits;
        next.serial.half = c.get_bool("serial half bit")?;
        next.serial.shifting = c.get_bool("serial shifting")?;
        next.serial.pending = c.get_bool("serial pending")?;
        next.serial.output = c.get_bool("serial direction")?;
        next.serial.sp_in = c.get_bool("sp pin")?;

        let pending = c.get_u8()?;
        let mask = c.get_u8()?;
        if (pending | mask) & !0x1F != 0 {
            return Err(c.invalid("icr", (u64::from(pending) << 8) | u64::from(mask)));
        }
        next.icr = InterruptControl::from_raw(pending, mask);
        next.cnt = c.get_bool("cnt pin")?;
        next.flag = c.get_bool("flag pin")?;
        for level in &mut next.pb_toggle {
            *level = c.get_bool("pb toggle")?;
        }
        for level in &mut next.pb_pulse {
            *level = c.get_bool("pb pulse")?;
        }
        Ok(next)
    }

    pub fn try_load_state(&mut self, input: &mut SnapshotReader<'_>) -> Result<(), SnapshotError> {
        *self = self.decode(input)?;
        Ok(())
    }

    /// Returns false, leaving the chip as it was, if the data is malformed.
    pub fn load_state(&mut self, input: &mut SnapshotReader<'_>) -> bool {
        match self.try_load_state(input) {
            Ok(()) => true,
            Err(e) => {
                warn!("{} state not loaded: {e}", self.name());
                false
            }
        }
    }
}
