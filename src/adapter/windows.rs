//! Windows implementation of the OS timezone adapter.
//!
//! Active zone and mutation go through the dynamic timezone information API;
//! rule definitions come from the registry's timezone catalog (the 44-byte
//! `TZI` blob plus the `Std`/`Dlt` display names); privilege handling adjusts
//! `SeTimeZonePrivilege` on the process token; the settings-change broadcast
//! uses a 5 second timeout and is abandoned past that.

use super::{
    AdapterError, NativeZoneKey, OsTimezoneAdapter, SystemDate, ZoneDefinition, ZoneRules,
};
use std::ptr;
use winapi::shared::minwindef::{BYTE, DWORD, HKEY};
use winapi::shared::winerror::{ERROR_NOT_ALL_ASSIGNED, ERROR_SUCCESS};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::CloseHandle;
use winapi::um::minwinbase::SYSTEMTIME;
use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
use winapi::um::securitybaseapi::AdjustTokenPrivileges;
use winapi::um::timezoneapi::{
    GetDynamicTimeZoneInformation, SetDynamicTimeZoneInformation, DYNAMIC_TIME_ZONE_INFORMATION,
};
use winapi::um::winbase::LookupPrivilegeValueW;
use winapi::um::winnt::{
    HANDLE, KEY_READ, LUID, SE_PRIVILEGE_ENABLED, TOKEN_ADJUST_PRIVILEGES, TOKEN_PRIVILEGES,
    TOKEN_QUERY,
};
use winapi::um::winreg::{RegCloseKey, RegOpenKeyExW, RegQueryValueExW, HKEY_LOCAL_MACHINE};
use winapi::um::winuser::{
    SendMessageTimeoutW, HWND_BROADCAST, SMTO_ABORTIFHUNG, WM_SETTINGCHANGE,
};

const TIME_ZONES_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Time Zones";
const TIME_ZONE_ID_INVALID: DWORD = 0xFFFF_FFFF;
const BROADCAST_TIMEOUT_MS: u32 = 5000;
const TZI_LEN: usize = 44;

pub struct WindowsAdapter;

impl WindowsAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Wide-string helpers ────────────────────────────────────────

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn to_wide_fixed<const N: usize>(s: &str) -> [u16; N] {
    let mut buf = [0u16; N];
    for (slot, unit) in buf.iter_mut().take(N - 1).zip(s.encode_utf16()) {
        *slot = unit;
    }
    buf
}

fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

fn last_error(context: &str) -> AdapterError {
    AdapterError(format!("{} (os error {})", context, unsafe { GetLastError() }))
}

// ─── SYSTEMTIME conversion ──────────────────────────────────────

fn system_date(st: &SYSTEMTIME) -> SystemDate {
    SystemDate {
        year: st.wYear,
        month: st.wMonth,
        day_of_week: st.wDayOfWeek,
        day: st.wDay,
        hour: st.wHour,
        minute: st.wMinute,
        second: st.wSecond,
        milliseconds: st.wMilliseconds,
    }
}

fn to_systemtime(date: &SystemDate) -> SYSTEMTIME {
    SYSTEMTIME {
        wYear: date.year,
        wMonth: date.month,
        wDayOfWeek: date.day_of_week,
        wDay: date.day,
        wHour: date.hour,
        wMinute: date.minute,
        wSecond: date.second,
        wMilliseconds: date.milliseconds,
    }
}

// ─── Registry catalog access ────────────────────────────────────

struct RegKey(HKEY);

impl RegKey {
    fn open(path: &str) -> Result<Self, AdapterError> {
        let wide_path = to_wide(path);
        let mut hkey: HKEY = ptr::null_mut();
        let status = unsafe {
            RegOpenKeyExW(HKEY_LOCAL_MACHINE, wide_path.as_ptr(), 0, KEY_READ, &mut hkey)
        };
        if status as DWORD != ERROR_SUCCESS {
            return Err(AdapterError(format!(
                "cannot open registry key '{}' (status {})",
                path, status
            )));
        }
        Ok(Self(hkey))
    }

    fn read_binary(&self, name: &str, expected_len: usize) -> Result<Vec<u8>, AdapterError> {
        let wide_name = to_wide(name);
        let mut len: DWORD = expected_len as DWORD;
        let mut data = vec![0u8; expected_len];
        let status = unsafe {
            RegQueryValueExW(
                self.0,
                wide_name.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
                data.as_mut_ptr() as *mut BYTE,
                &mut len,
            )
        };
        if status as DWORD != ERROR_SUCCESS || len as usize != expected_len {
            return Err(AdapterError(format!(
                "registry value '{}' missing or malformed (status {}, len {})",
                name, status, len
            )));
        }
        Ok(data)
    }

    fn read_string(&self, name: &str) -> Result<String, AdapterError> {
        let wide_name = to_wide(name);
        let mut buf = [0u16; 256];
        let mut len: DWORD = (buf.len() * 2) as DWORD;
        let status = unsafe {
            RegQueryValueExW(
                self.0,
                wide_name.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut BYTE,
                &mut len,
            )
        };
        if status as DWORD != ERROR_SUCCESS {
            return Err(AdapterError(format!(
                "registry value '{}' missing (status {})",
                name, status
            )));
        }
        Ok(from_wide(&buf))
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_system_date(bytes: &[u8], offset: usize) -> SystemDate {
    SystemDate {
        year: read_u16(bytes, offset),
        month: read_u16(bytes, offset + 2),
        day_of_week: read_u16(bytes, offset + 4),
        day: read_u16(bytes, offset + 6),
        hour: read_u16(bytes, offset + 8),
        minute: read_u16(bytes, offset + 10),
        second: read_u16(bytes, offset + 12),
        milliseconds: read_u16(bytes, offset + 14),
    }
}

/// Decode the registry's REG_TZI_FORMAT blob: three biases then the standard
/// and daylight transition dates, little-endian, 44 bytes total.
fn parse_tzi(bytes: &[u8]) -> ZoneRules {
    ZoneRules {
        bias: read_i32(bytes, 0),
        standard_bias: read_i32(bytes, 4),
        daylight_bias: read_i32(bytes, 8),
        standard_date: read_system_date(bytes, 12),
        daylight_date: read_system_date(bytes, 28),
    }
}

// ─── Token privilege adjustment ─────────────────────────────────

fn adjust_privilege(name: &str, enable: bool) -> Result<(), AdapterError> {
    let mut token: HANDLE = ptr::null_mut();
    let opened = unsafe {
        OpenProcessToken(
            GetCurrentProcess(),
            TOKEN_ADJUST_PRIVILEGES | TOKEN_QUERY,
            &mut token,
        )
    };
    if opened == 0 {
        return Err(last_error("cannot open process token"));
    }

    let result = (|| {
        let mut luid = LUID { LowPart: 0, HighPart: 0 };
        let wide_name = to_wide(name);
        let found =
            unsafe { LookupPrivilegeValueW(ptr::null(), wide_name.as_ptr(), &mut luid) };
        if found == 0 {
            return Err(last_error("privilege name lookup failed"));
        }

        let mut privileges = TOKEN_PRIVILEGES {
            PrivilegeCount: 1,
            Privileges: [winapi::um::winnt::LUID_AND_ATTRIBUTES {
                Luid: luid,
                Attributes: if enable { SE_PRIVILEGE_ENABLED } else { 0 },
            }],
        };

        let adjusted = unsafe {
            AdjustTokenPrivileges(
                token,
                0,
                &mut privileges,
                0,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        // AdjustTokenPrivileges can report success while assigning nothing.
        let status = unsafe { GetLastError() };
        if adjusted == 0 || status == ERROR_NOT_ALL_ASSIGNED {
            return Err(AdapterError(format!(
                "token adjustment refused for '{}' (os error {})",
                name, status
            )));
        }
        Ok(())
    })();

    unsafe {
        CloseHandle(token);
    }
    result
}

// ─── Adapter implementation ─────────────────────────────────────

impl OsTimezoneAdapter for WindowsAdapter {
    fn read_active(&self) -> Result<NativeZoneKey, AdapterError> {
        let mut info: DYNAMIC_TIME_ZONE_INFORMATION = unsafe { std::mem::zeroed() };
        let id = unsafe { GetDynamicTimeZoneInformation(&mut info) };
        if id == TIME_ZONE_ID_INVALID {
            return Err(last_error("GetDynamicTimeZoneInformation failed"));
        }
        Ok(NativeZoneKey::new(from_wide(&info.TimeZoneKeyName)))
    }

    fn fetch_definition(&self, key: &NativeZoneKey) -> Result<ZoneDefinition, AdapterError> {
        let reg = RegKey::open(&format!(r"{}\{}", TIME_ZONES_KEY, key.as_str()))?;
        let tzi = reg.read_binary("TZI", TZI_LEN)?;
        let standard_name = reg.read_string("Std")?;
        let daylight_name = reg.read_string("Dlt")?;

        Ok(ZoneDefinition {
            key: key.clone(),
            standard_name,
            daylight_name,
            rules: parse_tzi(&tzi),
        })
    }

    fn set_active(&self, definition: &ZoneDefinition) -> Result<(), AdapterError> {
        // Strict one-to-one copy from the fetched definition; standard and
        // daylight fields are never crossed.
        let info = DYNAMIC_TIME_ZONE_INFORMATION {
            Bias: definition.rules.bias,
            StandardName: to_wide_fixed::<32>(&definition.standard_name),
            StandardDate: to_systemtime(&definition.rules.standard_date),
            StandardBias: definition.rules.standard_bias,
            DaylightName: to_wide_fixed::<32>(&definition.daylight_name),
            DaylightDate: to_systemtime(&definition.rules.daylight_date),
            DaylightBias: definition.rules.daylight_bias,
            TimeZoneKeyName: to_wide_fixed::<128>(definition.key.as_str()),
            DynamicDaylightTimeDisabled: 0,
        };

        let ok = unsafe { SetDynamicTimeZoneInformation(&info) };
        if ok == 0 {
            return Err(last_error("SetDynamicTimeZoneInformation failed"));
        }
        Ok(())
    }

    fn acquire_privilege(&self, name: &str) -> Result<(), AdapterError> {
        adjust_privilege(name, true)
    }

    fn release_privilege(&self, name: &str) -> Result<(), AdapterError> {
        adjust_privilege(name, false)
    }

    fn broadcast_change(&self) -> Result<(), AdapterError> {
        let section = to_wide("intl");
        let mut result: usize = 0;
        let sent = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                0,
                section.as_ptr() as isize,
                SMTO_ABORTIFHUNG,
                BROADCAST_TIMEOUT_MS,
                &mut result,
            )
        };
        if sent == 0 {
            return Err(last_error("WM_SETTINGCHANGE broadcast timed out"));
        }
        Ok(())
    }
}
